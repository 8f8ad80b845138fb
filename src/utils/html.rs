use std::collections::HashSet;

use ammonia::Builder;

/// Reduce backend-provided HTML to plain text for the terminal.
///
/// Every tag is dropped; the text inside `<script>` and `<style>` goes
/// with it. ammonia re-escapes the remaining text, so the handful of
/// entities its serializer emits are decoded again afterwards.
pub fn plain_text(input: &str) -> String {
    let cleaned = Builder::empty()
        .clean_content_tags(HashSet::from(["script", "style"]))
        .clean(input)
        .to_string();

    cleaned
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}
