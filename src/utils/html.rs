/// Clean user-supplied HTML using the ammonia library.
///
/// Profile text (bio) is rendered by the client, so tags like `<script>` and
/// attributes like `onclick` are stripped before it is stored. Safe inline
/// tags such as `<b>` survive.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_script_but_keeps_text_markup() {
        let cleaned = clean_html("<b>Hello</b><script>alert(1)</script>");
        assert_eq!(cleaned, "<b>Hello</b>");
    }
}
