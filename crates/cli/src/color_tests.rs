use super::*;

#[test]
fn status_colors_success_green() {
    let colored = status("ok");
    assert!(colored.contains("32m") || colored == "ok");
}

#[test]
fn status_leaves_unknown_words_uncolored_when_no_color() {
    std::env::set_var("NO_COLOR", "1");
    assert_eq!(status("pending"), "pending");
    assert_eq!(header("Run"), "Run");
    std::env::remove_var("NO_COLOR");
}

#[test]
fn should_colorize_respects_no_color_override() {
    std::env::set_var("NO_COLOR", "1");
    assert!(!should_colorize());
    std::env::remove_var("NO_COLOR");
}
