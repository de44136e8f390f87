use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "studylog")]
#[command(about = "Track study time from voice-channel presence")]
#[command(long_about = "studylog - voice-channel study session tracker

Follows members as they join, leave and move between voice channels,
records every stretch of study time, and posts a summary of everyone's
daily total at the end of the day (23:59:59 UTC+9 by default).

QUICK START:
  studylog serve --events events.jsonl   Replay presence events
  tail -f feed.jsonl | studylog serve    Follow a live event feed
  studylog today                         Show today's totals
  studylog history --user 42             Show stored intervals

CHAT COMMANDS (inside the event feed):
  !pause @member     !resume @member     !today [@member]     !reset @member

OUTPUT FORMATS:
  --output pretty    Chat-style text (default)
  --output json      One JSON object per notification

For more information on a specific command, run:
  studylog <command> --help")]
#[command(version, propagate_version = true)]
pub struct Cli {
    /// Output format for command results
    ///
    /// Use 'pretty' for chat-style text (default),
    /// or 'json' for machine-readable output suitable for scripting.
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Data directory holding config.yaml and the database
    ///
    /// Defaults to ~/.studylog.
    #[arg(long, global = true, env = "STUDYLOG_HOME")]
    pub home: Option<PathBuf>,

    /// Log debug details to stderr
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Output format for command results.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Chat-style text output.
    #[default]
    Pretty,
    /// Machine-readable JSON output.
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Track presence events and post notifications
    ///
    /// Reads newline-delimited JSON presence events and writes every
    /// notification to stdout. The end-of-day reporter runs alongside
    /// until the input ends or the process is interrupted.
    ///
    /// # Event lines
    ///
    ///   {"type":"join","user_id":1,"display_name":"Alice","channel":"Study Room"}
    ///   {"type":"move","user_id":1,"from":"Study Room","to":"Quiet Room"}
    ///   {"type":"leave","user_id":1,"display_name":"Alice"}
    ///   {"type":"message","author_id":2,"text":"!pause <@1>"}
    ///
    /// Each line may carry an RFC 3339 "at" timestamp; without one the
    /// current time is used.
    Serve {
        /// Read events from a file instead of stdin
        #[arg(long, short = 'e')]
        events: Option<PathBuf>,
    },

    /// Show today's study time
    ///
    /// Without --user, lists everyone who has recorded time today.
    #[command(alias = "t")]
    Today {
        /// Only show this member
        #[arg(long, short = 'u')]
        user: Option<u64>,
    },

    /// Clear a member's study time for today
    Reset {
        /// Member to reset
        user_id: u64,
    },

    /// List stored intervals, newest first
    #[command(alias = "h")]
    History {
        /// Only show this member
        #[arg(long, short = 'u')]
        user: Option<u64>,

        /// Only show this day (today, yesterday, or YYYY-MM-DD)
        #[arg(long, short = 'd')]
        date: Option<String>,

        /// Maximum number of intervals
        #[arg(long, short = 'n', default_value = "50")]
        limit: usize,
    },

    /// Print the end-of-day summary for today without resetting anything
    Summary,

    /// Generate shell completions
    ///
    /// Example: studylog completions bash > ~/.bash_completion.d/studylog
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}
