//! Progress bar construction shared by training and batch encode/decode.

use indicatif::{ProgressBar, ProgressStyle, style::TemplateError};

/// Creates a styled progress bar with elapsed time, a fixed-width message label, and position/total counters.
///
/// # Arguments
///
/// * `size` - The total number of steps the progress bar represents.
/// * `msg` - The message label displayed alongside the progress bar.
///
/// # Errors
///
/// Returns a [`TemplateError`] if the progress bar style template is invalid.
pub(crate) fn progress_bar(size: u64, msg: impl Into<String>) -> Result<ProgressBar, TemplateError> {
    let style = ProgressStyle::default_bar()
        .template("[{elapsed_precise}] {msg:<30!} {wide_bar} {pos}/{len}")?;

    let pb = ProgressBar::new(size);
    pb.set_style(style);
    pb.set_message(msg.into());
    pb.enable_steady_tick(std::time::Duration::from_secs(1));

    Ok(pb)
}

/// Returns a visible bar when `show` is set, otherwise one that never renders.
pub(crate) fn optional_progress_bar(
    show: bool,
    size: u64,
    msg: impl Into<String>,
) -> Result<ProgressBar, TemplateError> {
    if show {
        progress_bar(size, msg)
    } else {
        Ok(ProgressBar::hidden())
    }
}
