//! Terminal rendering of sessions, calls and patterns

use clap::ValueEnum;
use closepulse_core::{CallRecord, PatternGroup, ProgressTone, SessionSnapshot};
use closepulse_dashboard::CallDetail;
use serde::Serialize;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub(crate) enum OutputFormat {
    /// Human-readable text
    #[default]
    Table,
    /// Pretty-printed JSON
    Json,
}

/// Serialize `value` as pretty JSON
pub(crate) fn json<T: Serialize + ?Sized>(value: &T) -> serde_json::Result<String> {
    serde_json::to_string_pretty(value)
}

/// One-line session summary
pub(crate) fn session(snapshot: &SessionSnapshot) -> String {
    match &snapshot.session {
        Some(session) => format!(
            "Signed in as {} <{}> (id {})",
            session.name, session.email, session.id
        ),
        None => format!("Not signed in ({})", snapshot.state),
    }
}

/// Terminate every line, including the last
fn lines_to_text(lines: &[String]) -> String {
    lines.iter().map(|line| format!("{line}\n")).collect()
}

/// Call list with the active row marked
pub(crate) fn call_table(calls: &[&CallRecord], is_selected: impl Fn(&CallRecord) -> bool) -> String {
    if calls.is_empty() {
        return "No calls match your search.\n".to_string();
    }

    let header = format!(
        "  {:>3}  {:<10}  {:<8}  {:<18}  {:<14}  {:>8}  {:<9}  {}",
        "ID", "DATE", "TIME", "CUSTOMER", "AGENT", "DURATION", "OUTCOME", "SENTIMENT"
    );
    let rows = calls.iter().map(|call| {
        let marker = if is_selected(call) { '>' } else { ' ' };
        format!(
            "{marker} {:>3}  {:<10}  {:<8}  {:<18}  {:<14}  {:>8}  {:<9}  {}",
            call.id.0,
            call.date.format("%Y-%m-%d").to_string(),
            call.time,
            call.customer,
            call.agent,
            call.duration_label,
            call.outcome.to_string(),
            call.sentiment
        )
    });
    let lines: Vec<String> = std::iter::once(header).chain(rows).collect();
    lines_to_text(&lines)
}

/// Detail panel for one call
pub(crate) fn call_detail(detail: &CallDetail<'_>) -> String {
    let call = detail.record;
    let mut lines = vec![
        format!("{} with {}", call.customer, call.agent),
        format!(
            "{} {}  ·  {}  ·  {}  ·  {}",
            call.date.format("%Y-%m-%d"),
            call.time,
            call.duration_label,
            call.outcome,
            call.sentiment
        ),
        format!("Topics: {}", call.topics.join(", ")),
        String::new(),
        "Transcript".to_string(),
        call.transcript.clone(),
        String::new(),
        "Strengths".to_string(),
    ];
    lines.extend(call.strengths.iter().map(|strength| format!("  + {strength}")));
    lines.push(String::new());
    lines.push("Areas for Improvement".to_string());
    lines.extend(call.weaknesses.iter().map(|weakness| format!("  - {weakness}")));
    lines.extend([
        String::new(),
        detail.outcome_heading.clone(),
        call.why.clone(),
        String::new(),
        "Sentiment Analysis".to_string(),
        detail.sentiment_summary.clone(),
    ]);
    lines_to_text(&lines)
}

const BAR_WIDTH: usize = 20;

fn bar(percentage: u8) -> String {
    let filled = usize::from(percentage.min(100)) * BAR_WIDTH / 100;
    format!("{}{}", "#".repeat(filled), ".".repeat(BAR_WIDTH - filled))
}

const fn tone_label(tone: ProgressTone) -> &'static str {
    match tone {
        ProgressTone::Strong => "strong",
        ProgressTone::Moderate => "moderate",
        ProgressTone::Weak => "weak",
    }
}

/// Pattern panel
pub(crate) fn patterns(groups: &[PatternGroup]) -> String {
    let mut lines = Vec::new();
    for group in groups {
        lines.push(group.title.clone());
        lines.push(format!("  {}", group.description));
        lines.extend(group.items.iter().map(|item| {
            format!(
                "  [{}] {:>3}% {:<8} {}",
                bar(item.percentage),
                item.percentage,
                tone_label(item.tone()),
                item.text
            )
        }));
        lines.push(String::new());
    }
    lines_to_text(&lines)
}
