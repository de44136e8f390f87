use chrono::NaiveDate;
use colored::Colorize;

use crate::core::format_hms;
use crate::error::StudyError;
use crate::features::durations::{IntervalRecord, MemberTotal};
use crate::features::reporter::DailySummary;
use crate::features::sessions::SessionEvent;

fn total_line(line: &MemberTotal) -> String {
    format!("- {} : {}", line.member.display_name, line.total.hms)
}

fn total_lines(header: String, lines: &[MemberTotal]) -> String {
    let mut output = header;
    for line in lines {
        output.push('\n');
        output.push_str(&total_line(line));
    }
    output
}

/// Format a session event as a chat message
pub fn format_event_pretty(event: &SessionEvent) -> String {
    match event {
        SessionEvent::Started { member, today, .. } => {
            let name = &member.display_name;
            format!(
                "{}\n- {name} : {}",
                format!("▶️ {name} started studying!").bold(),
                today.hms
            )
        }
        SessionEvent::Ended {
            member,
            session_seconds,
            resumed_seconds,
            today,
        } => {
            let session = match resumed_seconds {
                Some(resumed) => format!("{} (+ {})", format_hms(*session_seconds), format_hms(*resumed)),
                None => format_hms(*session_seconds),
            };
            format!(
                "{}\n- This session : {session}\n- Today : {}",
                format!("⏹️ {} finished studying!", member.display_name).bold(),
                today.hms
            )
        }
        SessionEvent::Moved { member, from, to } => {
            format!("{} moved: {from} -> {to}", member.display_name)
                .dimmed()
                .to_string()
        }
        SessionEvent::Paused {
            member,
            session_seconds,
            delta_seconds,
            continued,
        } => {
            let session = if *continued {
                format!("{} (+ {})", format_hms(*session_seconds), format_hms(*delta_seconds))
            } else {
                format_hms(*session_seconds)
            };
            format!(
                "{}\n- This session : {session}",
                format!("⏸️ {} paused!", member.display_name).bold()
            )
        }
        SessionEvent::Resumed {
            member,
            session_seconds,
            ..
        } => format!(
            "{}\n- This session : {}",
            format!("▶️ {} resumed studying!", member.display_name).bold(),
            format_hms(*session_seconds)
        ),
        SessionEvent::Total { line } => total_line(line),
        SessionEvent::Roster { lines, .. } => {
            total_lines("✅ Today's study time".bold().to_string(), lines)
        }
        SessionEvent::Reset { member, today } => {
            let name = &member.display_name;
            format!(
                "{}\n- {name} : {}",
                format!("🔄️ {name}'s study time for today was reset!").bold(),
                today.hms
            )
        }
    }
}

/// Format the end-of-day summary
pub fn format_summary_pretty(summary: &DailySummary) -> String {
    let header = format!("🏷️ [{}] :", summary.date.format("%Y.%m.%d"));
    total_lines(header.bold().to_string(), &summary.lines)
}

/// Format a rejected command
pub fn format_rejection_pretty(error: &StudyError) -> String {
    format!("❗️ {error}").yellow().to_string()
}

/// Format stored totals for one day
pub fn format_totals_pretty(day: NaiveDate, lines: &[MemberTotal]) -> String {
    let header = format!("Study time for {day}").bold().to_string();
    if lines.is_empty() {
        return format!("{header}\n  No records");
    }
    total_lines(header, lines)
}

/// Format interval records as a table
pub fn format_records_pretty(records: &[IntervalRecord]) -> String {
    if records.is_empty() {
        return "Intervals (0 items)\n  No records".to_string();
    }

    let mut output = format!("Intervals ({} items)\n", records.len());
    output.push_str(&"─".repeat(60));
    output.push('\n');

    for record in records {
        output.push_str(&format!(
            "{}  {}  {}  {}\n",
            record.start_time.format("%Y-%m-%d %H:%M:%S").to_string().dimmed(),
            format_hms(record.duration_seconds).cyan(),
            record.display_name.bold(),
            record.channel_name
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    use crate::features::durations::DailyTotal;
    use crate::presence::Member;

    fn day() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()
    }

    fn alice() -> Member {
        Member::new(1, "Alice")
    }

    fn line(member: Member, seconds: i64) -> MemberTotal {
        MemberTotal {
            total: DailyTotal::new(member.id, day(), seconds),
            member,
        }
    }

    #[test]
    fn test_started_shows_daily_total() {
        let output = format_event_pretty(&SessionEvent::Started {
            member: alice(),
            channel: "Study Room".to_string(),
            today: DailyTotal::new(1, day(), 3725),
        });

        assert!(output.contains("▶️ Alice started studying!"));
        assert!(output.contains("- Alice : 01:02:05"));
    }

    #[test]
    fn test_ended_after_resume_shows_delta() {
        let output = format_event_pretty(&SessionEvent::Ended {
            member: alice(),
            session_seconds: 60,
            resumed_seconds: Some(30),
            today: DailyTotal::new(1, day(), 60),
        });

        assert!(output.contains("⏹️ Alice finished studying!"));
        assert!(output.contains("- This session : 00:01:00 (+ 00:00:30)"));
        assert!(output.contains("- Today : 00:01:00"));
    }

    #[test]
    fn test_ended_without_resume_has_no_delta() {
        let output = format_event_pretty(&SessionEvent::Ended {
            member: alice(),
            session_seconds: 45,
            resumed_seconds: None,
            today: DailyTotal::new(1, day(), 45),
        });

        assert!(output.contains("- This session : 00:00:45\n"));
        assert!(!output.contains("(+"));
    }

    #[test]
    fn test_first_pause_has_no_delta() {
        let first = format_event_pretty(&SessionEvent::Paused {
            member: alice(),
            session_seconds: 30,
            delta_seconds: 30,
            continued: false,
        });
        assert!(first.contains("- This session : 00:00:30"));
        assert!(!first.contains("(+"));

        let second = format_event_pretty(&SessionEvent::Paused {
            member: alice(),
            session_seconds: 90,
            delta_seconds: 60,
            continued: true,
        });
        assert!(second.contains("- This session : 00:01:30 (+ 00:01:00)"));
    }

    #[test]
    fn test_roster_lists_members() {
        let output = format_event_pretty(&SessionEvent::Roster {
            day: day(),
            lines: vec![line(alice(), 0), line(Member::new(2, "Bob"), 1800)],
        });

        assert!(output.contains("Today's study time"));
        assert!(output.contains("- Alice : 00:00:00"));
        assert!(output.contains("- Bob : 00:30:00"));
    }

    #[test]
    fn test_reset_reports_zero() {
        let output = format_event_pretty(&SessionEvent::Reset {
            member: alice(),
            today: DailyTotal::new(1, day(), 0),
        });
        assert!(output.contains("- Alice : 00:00:00"));
    }

    #[test]
    fn test_summary_header() {
        let output = format_summary_pretty(&DailySummary {
            date: day(),
            lines: vec![line(alice(), 7200)],
        });

        assert!(output.contains("🏷️ [2024.03.01] :"));
        assert!(output.ends_with("- Alice : 02:00:00"));
    }

    #[test]
    fn test_rejection_uses_error_message() {
        let output = format_rejection_pretty(&StudyError::NotPaused("Bob".to_string()));
        assert!(output.contains("Bob is not paused"));
    }

    #[test]
    fn test_records_table() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let record = IntervalRecord::new(&alice(), "Study Room", start, start + chrono::Duration::minutes(25));
        let output = format_records_pretty(&[record]);

        assert!(output.contains("Intervals (1 items)"));
        assert!(output.contains("00:25:00"));
        assert!(output.contains("Study Room"));
    }

    #[test]
    fn test_empty_totals() {
        let output = format_totals_pretty(day(), &[]);
        assert!(output.contains("No records"));
    }
}
