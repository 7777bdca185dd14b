/// 生成翻译提示词
pub fn translate_prompt(text: &str) -> String {
    format!(
        "You are an expert in the language of William Shakespeare. Render the following modern \
English text in Shakespearean English.\n\
Keep the original meaning, but use the vocabulary, grammar and style of Shakespeare's plays.\n\
Use archaic pronouns and verb forms such as thee, thou, thy, thine, hath and doth where they fit.\n\
\n\
Modern text: {text}\n\
\n\
Shakespearean translation:\n"
    )
}

/// 生成十四行诗提示词
pub fn sonnet_prompt(topic: &str) -> String {
    format!(
        "You are a poet writing in the manner of William Shakespeare. Compose a Shakespearean \
sonnet of 14 lines in iambic pentameter on the topic or theme below.\n\
Follow the traditional structure:\n\
- Three quatrains (4-line stanzas) followed by a closing couplet\n\
- Rhyme scheme ABAB CDCD EFEF GG\n\
- Iambic pentameter in every line\n\
- A turn (volta) in thought at the couplet\n\
\n\
Topic: {topic}\n\
\n\
Sonnet:\n"
    )
}
