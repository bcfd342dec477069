//! Terminal rendering for sessions and saved sets.

use spintimer_core::storage::DisplayConfig;
use spintimer_core::{format_clock, Event, IntervalSequence, Projection, RunMode};

const BELL: &str = "\x07";

/// Wrap `text` in a 24-bit foreground color escape.
pub fn paint(text: &str, hex: &str, enabled: bool) -> String {
    match (enabled, hex_to_rgb(hex)) {
        (true, Some((r, g, b))) => format!("\x1b[38;2;{r};{g};{b}m{text}\x1b[0m"),
        _ => text.to_string(),
    }
}

fn hex_to_rgb(hex: &str) -> Option<(u8, u8, u8)> {
    let digits = hex.strip_prefix('#')?;
    if digits.len() != 6 {
        return None;
    }
    let channel = |i: usize| u8::from_str_radix(digits.get(i..i + 2)?, 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

pub fn progress_bar(fraction: f64, width: u32) -> String {
    let width = width as usize;
    let filled = ((fraction.clamp(0.0, 1.0) * width as f64).round() as usize).min(width);
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn mode_label(mode: RunMode) -> &'static str {
    match mode {
        RunMode::Idle => "idle",
        RunMode::Running => "running",
        RunMode::Paused => "paused",
        RunMode::Completed => "done",
    }
}

/// One-line status for the current snapshot.
pub fn status_line(p: &Projection, display: &DisplayConfig) -> String {
    let Some(interval) = &p.current_interval else {
        return "no intervals loaded".to_string();
    };
    let index = p.current_index.unwrap_or(0) + 1;
    let bar = paint(
        &progress_bar(p.progress_fraction, display.progress_bar_width),
        &interval.color,
        display.color_output,
    );
    let next = match &p.next_interval {
        Some(n) => format!("  next: {}", n.name),
        None => String::new(),
    };
    format!(
        "[{index}/{count}] {name} {bar} {left} left | total {remaining} left ({mode}){next}",
        count = p.interval_count,
        name = paint(&interval.name, &interval.color, display.color_output),
        left = format_clock(p.current_interval_remaining_secs),
        remaining = format_clock(p.remaining_total_secs),
        mode = mode_label(p.run_mode),
    )
}

/// Human line for an event, or `None` for events the status line covers.
pub fn event_line(event: &Event, display: &DisplayConfig) -> Option<String> {
    match event {
        Event::IntervalAdvanced {
            to_index,
            name,
            duration_secs,
            skipped,
            ..
        } => {
            let bell = if display.bell_on_advance { BELL } else { "" };
            let how = if *skipped { "skipped to" } else { "now" };
            Some(format!(
                "{bell}>> {how} #{} {name} ({})",
                to_index + 1,
                format_clock(*duration_secs)
            ))
        }
        Event::SessionCompleted {
            total_secs,
            interval_count,
            finished_early,
            ..
        } => {
            let bell = if display.bell_on_advance { BELL } else { "" };
            let early = if *finished_early { " (finished early)" } else { "" };
            Some(format!(
                "{bell}Training complete: {interval_count} intervals, {}{early}",
                format_clock(*total_secs)
            ))
        }
        Event::TrainingPaused { .. } => Some("paused".into()),
        Event::TrainingResumed { .. } => Some("resumed".into()),
        Event::TrainingStopped { .. } => Some("stopped".into()),
        Event::TrainingReset { .. } => Some("reset; press g to start".into()),
        Event::SequenceLoaded { .. } | Event::TrainingStarted { .. } => None,
    }
}

/// Timeline table for a sequence: index, start offset, duration, type, name.
pub fn timeline(sequence: &IntervalSequence, color: bool) -> String {
    let mut out = String::new();
    for (i, interval) in sequence.intervals().iter().enumerate() {
        out.push_str(&format!(
            "{:>3}  {:>6}  {:>6}  {:<8}  {}\n",
            i + 1,
            format_clock(sequence.start_of(i)),
            format_clock(interval.duration_secs),
            interval.category,
            paint(&interval.name, &interval.color, color),
        ));
    }
    out.push_str(&format!(
        "total {}\n",
        format_clock(sequence.total_duration_secs())
    ));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rgb_parsing() {
        assert_eq!(hex_to_rgb("#FF8000"), Some((255, 128, 0)));
        assert_eq!(hex_to_rgb("FF8000"), None);
        assert_eq!(hex_to_rgb("#ÿÿÿ"), None);
    }

    #[test]
    fn paint_disabled_is_plain() {
        assert_eq!(paint("x", "#FF0000", false), "x");
        assert_eq!(paint("x", "#FF0000", true), "\x1b[38;2;255;0;0mx\x1b[0m");
    }

    #[test]
    fn bar_widths() {
        assert_eq!(progress_bar(0.0, 4), "░░░░");
        assert_eq!(progress_bar(0.5, 4), "██░░");
        assert_eq!(progress_bar(2.0, 4), "████");
    }
}
