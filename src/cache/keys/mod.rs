/// 翻译结果缓存键前缀
const TRANSLATE_PREFIX: &str = "translate:";

/// 十四行诗结果缓存键前缀
const SONNET_PREFIX: &str = "sonnet:";

/// 限流计数键前缀
const RATE_LIMIT_PREFIX: &str = "rate_limit:";

/// 请求日志列表键
pub const REQUEST_LOG_KEY: &str = "request_logs";

/// 生成翻译结果缓存键，使用原始输入，不做裁剪
pub fn translate_key(text: &str) -> String {
    format!("{}{}", TRANSLATE_PREFIX, text)
}

/// 生成十四行诗结果缓存键
pub fn sonnet_key(topic: &str) -> String {
    format!("{}{}", SONNET_PREFIX, topic)
}

/// 生成客户端限流计数键
pub fn rate_limit_key(client: &str) -> String {
    format!("{}{}", RATE_LIMIT_PREFIX, client)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operations_do_not_collide() {
        assert_ne!(translate_key("love"), sonnet_key("love"));
        assert_eq!(translate_key("love"), "translate:love");
        assert_eq!(sonnet_key("love"), "sonnet:love");
    }

    #[test]
    fn raw_input_is_kept_verbatim() {
        assert_eq!(translate_key("  Hello "), "translate:  Hello ");
        assert_ne!(translate_key("Hello"), translate_key("Hello "));
    }
}
