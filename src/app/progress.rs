use std::io::{IsTerminal, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{Clear, ClearType},
};

use wmetrics::http::RequestsProgress;

const SPINNER_FRAMES: [&str; 4] = ["|", "/", "-", "\\"];

/// Request-count progress bar drawn on stderr.
pub(crate) struct ProgressBar {
    style: ProgressStyle,
    no_color: bool,
    frame: usize,
}

impl ProgressBar {
    /// Returns `None` when stderr is not a terminal.
    pub(crate) fn for_terminal(no_color: bool) -> Option<Self> {
        if !std::io::stderr().is_terminal() {
            return None;
        }
        Some(Self::new(no_color))
    }

    fn new(no_color: bool) -> Self {
        Self {
            style: ProgressStyle::new(40),
            no_color,
            frame: 0,
        }
    }

    pub(crate) fn update(&mut self, progress: &RequestsProgress) {
        let line = build_progress_line(&self.style, progress, self.frame, self.no_color);
        self.frame = self.frame.wrapping_add(1);
        if render_progress_line(&line, self.no_color).is_err() {
            tracing::debug!("Failed to draw progress bar");
        }
    }
}

pub(crate) fn finish_progress_line() {
    let mut out = std::io::stderr();
    if out.write_all(b"\n").and_then(|()| out.flush()).is_err() {
        tracing::debug!("Failed to finish progress bar");
    }
}

fn render_progress_line(line: &[ProgressSegment], no_color: bool) -> Result<(), std::io::Error> {
    let mut out = std::io::stderr();
    queue!(out, cursor::MoveToColumn(0), Clear(ClearType::CurrentLine))?;
    for segment in line {
        match segment.color {
            Some(color) if !no_color => {
                queue!(
                    out,
                    SetForegroundColor(color),
                    Print(&segment.text),
                    ResetColor
                )?;
            }
            Some(_) | None => queue!(out, Print(&segment.text))?,
        }
    }
    out.flush()?;
    Ok(())
}

fn build_progress_line(
    style: &ProgressStyle,
    progress: &RequestsProgress,
    frame: usize,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let failed_text = if progress.failed > 0 {
        Some(format!(" ({} failed)", progress.failed))
    } else {
        None
    };

    let mut segments = match u64::try_from(progress.total) {
        Ok(total) if !progress.is_unbounded() => {
            bounded_segments(style, progress.completed, total, no_color)
        }
        Ok(_) | Err(_) => {
            let spinner = frame
                .checked_rem(SPINNER_FRAMES.len())
                .and_then(|index| SPINNER_FRAMES.get(index))
                .copied()
                .unwrap_or("|");
            vec![
                ProgressSegment::plain(format!("[{}]", spinner)),
                ProgressSegment::colored(format!(" {} requests", progress.completed), Color::Cyan),
            ]
        }
    };

    if let Some(text) = failed_text {
        segments.push(ProgressSegment::colored(text, Color::Red));
    }
    segments
}

fn bounded_segments(
    style: &ProgressStyle,
    completed: u64,
    total: u64,
    no_color: bool,
) -> Vec<ProgressSegment> {
    let size = style.size.max(1);
    let goal = total.max(1);
    let current = completed.min(goal);

    let size_u128 = u128::from(u64::try_from(size).unwrap_or(u64::MAX));
    let scaled = u128::from(current)
        .saturating_mul(size_u128)
        .checked_div(u128::from(goal))
        .unwrap_or(0);
    let complete_size = usize::try_from(scaled).unwrap_or(size).min(size);
    let incomplete_size = size.saturating_sub(complete_size);

    let percent_x100 = u128::from(current)
        .saturating_mul(10_000)
        .checked_div(u128::from(goal))
        .unwrap_or(0);
    let percent_text = format!(" {}.{:02}%", percent_x100 / 100, percent_x100 % 100);
    let count_text = format!(" | {}/{}", completed, total);

    let progress_bar = format!(
        "{}{}{}{}",
        style.begin,
        style.fill.repeat(complete_size),
        style.empty.repeat(incomplete_size),
        style.end
    );

    if no_color {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::plain(percent_text),
            ProgressSegment::plain(count_text),
        ]
    } else {
        vec![
            ProgressSegment::plain(progress_bar),
            ProgressSegment::colored(percent_text, Color::Cyan),
            ProgressSegment::colored(count_text, Color::Yellow),
        ]
    }
}

struct ProgressStyle {
    size: usize,
    begin: String,
    end: String,
    fill: String,
    empty: String,
}

impl ProgressStyle {
    fn new(size: usize) -> Self {
        Self {
            size,
            begin: "[".to_owned(),
            end: "]".to_owned(),
            fill: "#".to_owned(),
            empty: "-".to_owned(),
        }
    }
}

struct ProgressSegment {
    text: String,
    color: Option<Color>,
}

impl ProgressSegment {
    const fn plain(text: String) -> Self {
        Self { text, color: None }
    }

    const fn colored(text: String, color: Color) -> Self {
        Self {
            text,
            color: Some(color),
        }
    }
}
