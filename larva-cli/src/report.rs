//! Report generation
//!
//! Renders analysis results as console text (with an ASCII larva timeline) or JSON.

use larva_analyzer::{PlayerReport, ProducerStats, TimelineSample};
use serde::Serialize;
use std::fmt::{self, Write};

/// Analysis results for one replay file
#[derive(Debug, Serialize)]
pub struct ReplayReport {
    pub replay: String,
    pub players: Vec<PlayerReport>,
}

/// Render a replay report as console text
pub fn render_text(report: &ReplayReport, show_timeline: bool) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = write_text(&mut out, report, show_timeline);
    out
}

/// Render a set of replay reports as pretty-printed JSON
pub fn render_json(reports: &[ReplayReport]) -> serde_json::Result<String> {
    serde_json::to_string_pretty(reports)
}

fn write_text(out: &mut impl Write, report: &ReplayReport, show_timeline: bool) -> fmt::Result {
    writeln!(out, "═══════════════════════════════════════════════")?;
    writeln!(out, "  Analyzing replay: {}", report.replay)?;
    writeln!(out, "═══════════════════════════════════════════════")?;

    if report.players.is_empty() {
        writeln!(out, "\nNo matching players in this replay.")?;
    }

    for player in &report.players {
        render_player(out, player)?;
        if show_timeline {
            render_timeline(out, &player.timeline, player.timeline_bucket_seconds)?;
        }
    }
    Ok(())
}

fn render_player(out: &mut impl Write, report: &PlayerReport) -> fmt::Result {
    writeln!(out, "\n{}", report.player)?;
    writeln!(
        out,
        "\tNum creep tumors produced in first {} seconds: {}",
        report.creep_cutoff_seconds, report.creep_tumors
    )?;
    match report.average_token_lifetime {
        Some(lifetime) => writeln!(out, "\tAverage larva lifetime: {:.1}s", lifetime)?,
        None => writeln!(out, "\tAverage larva lifetime: no data")?,
    }
    if report.unattributed_tokens > 0 {
        writeln!(
            out,
            "\tLarvae without a hatchery: {}",
            report.unattributed_tokens
        )?;
    }

    for (index, producer) in report.producers.iter().enumerate() {
        render_producer(out, index + 1, producer)?;
    }
    Ok(())
}

fn render_producer(out: &mut impl Write, number: usize, stats: &ProducerStats) -> fmt::Result {
    writeln!(out, "\n\tHatchery #{}:", number)?;
    writeln!(out, "\tCompleted at: {}s", stats.completed_at_second())?;
    if let Some(died) = stats.active_until {
        writeln!(out, "\tDestroyed at: {}s", died.round())?;
    }
    writeln!(out, "\tTotal larvae spawned: {}", stats.total_tokens)?;
    writeln!(
        out,
        "\tTime larvae capped: {:.1}%",
        stats.fraction_time_capped * 100.0
    )?;
    writeln!(
        out,
        "\tNum larvae missed due to being capped: {}",
        stats.estimated_tokens_lost
    )
}

fn render_timeline(
    out: &mut impl Write,
    samples: &[TimelineSample],
    bucket_seconds: u32,
) -> fmt::Result {
    writeln!(out, "\nLarvae Timeline ({}s steps):", bucket_seconds)?;
    for sample in samples {
        let (minutes, seconds) = (sample.second / 60, sample.second % 60);
        let bar = "X".repeat(sample.count.max(0) as usize);
        writeln!(out, "{:02}:{:02}: {}", minutes, seconds, bar)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use larva_analyzer::{ExtractionDiagnostics, PlayerInfo};

    fn player_report() -> PlayerReport {
        PlayerReport {
            player: PlayerInfo {
                id: 1,
                name: "Serral".to_string(),
                race: "Zerg".to_string(),
            },
            creep_tumors: 14,
            creep_cutoff_seconds: 600.0,
            average_token_lifetime: Some(12.5),
            total_tokens: 3,
            unattributed_tokens: 0,
            producers: vec![ProducerStats {
                producer_id: 77,
                active_from: 0.4,
                active_until: None,
                window_seconds: 10,
                total_tokens: 3,
                capped_seconds: 1,
                fraction_time_capped: 0.1,
                estimated_tokens_lost: 0,
                diagnostics: Default::default(),
            }],
            timeline: vec![
                TimelineSample { second: 0, count: 1 },
                TimelineSample { second: 65, count: 3 },
            ],
            timeline_bucket_seconds: 5,
            diagnostics: ExtractionDiagnostics::default(),
        }
    }

    #[test]
    fn test_text_report() {
        let report = ReplayReport {
            replay: "ladder.json".to_string(),
            players: vec![player_report()],
        };
        let text = render_text(&report, true);

        assert!(text.contains("Analyzing replay: ladder.json"));
        assert!(text.contains("Player 1 - Serral (Zerg)"));
        assert!(text.contains("Num creep tumors produced in first 600 seconds: 14"));
        assert!(text.contains("Average larva lifetime: 12.5s"));
        assert!(text.contains("Hatchery #1:"));
        assert!(text.contains("Completed at: 0s"));
        assert!(text.contains("Time larvae capped: 10.0%"));
        assert!(text.contains("00:00: X\n"));
        assert!(text.contains("01:05: XXX\n"));
    }

    #[test]
    fn test_no_data_and_hidden_timeline() {
        let mut player = player_report();
        player.average_token_lifetime = None;
        let report = ReplayReport {
            replay: "x".to_string(),
            players: vec![player],
        };
        let text = render_text(&report, false);

        assert!(text.contains("Average larva lifetime: no data"));
        assert!(!text.contains("Larvae Timeline"));
    }

    struct FullBuffer {
        room: usize,
    }

    impl Write for FullBuffer {
        fn write_str(&mut self, s: &str) -> fmt::Result {
            self.room = self.room.checked_sub(s.len()).ok_or(fmt::Error)?;
            Ok(())
        }
    }

    #[test]
    fn test_write_error_stops_rendering() {
        let report = ReplayReport {
            replay: "ladder.json".to_string(),
            players: vec![player_report()],
        };
        let mut out = FullBuffer { room: 200 };

        assert!(write_text(&mut out, &report, true).is_err());
        assert!(write_text(&mut FullBuffer { room: 1 << 16 }, &report, true).is_ok());
    }

    #[test]
    fn test_json_report() {
        let reports = vec![ReplayReport {
            replay: "ladder.json".to_string(),
            players: vec![player_report()],
        }];
        let json = render_json(&reports).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value[0]["replay"], "ladder.json");
        assert_eq!(value[0]["players"][0]["producers"][0]["capped_seconds"], 1);
    }
}
