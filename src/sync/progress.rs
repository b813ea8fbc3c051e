use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::time::Duration;

/// Yellow braille spinner followed by the current message.
pub fn spinner_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[33m{spinner}\x1b[0m {wide_msg}")
        .unwrap()
        .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"])
}

pub fn ok_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[32m✔\x1b[0m {wide_msg}").unwrap()
}

/// Grey dash: nothing to do for this component.
pub fn skip_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[90m-\x1b[0m {wide_msg}").unwrap()
}

pub fn err_style() -> ProgressStyle {
    ProgressStyle::with_template("\x1b[31m✘\x1b[0m {wide_msg}").unwrap()
}

/// Add a ticking spinner showing `msg` to `mp`.
pub fn spinner(mp: &MultiProgress, msg: String) -> ProgressBar {
    let pb = mp.add(ProgressBar::new_spinner());
    pb.set_style(spinner_style());
    pb.set_message(msg);
    pb.enable_steady_tick(Duration::from_millis(80));
    pb
}
