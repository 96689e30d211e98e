//! Trace replay and terminal output for tracker state

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;
use tracing::info;

use touchgrid::trace::Trace;
use touchgrid::tracker::ContactSnapshot;
use touchgrid::{EventOutcome, TouchEvent, TouchTracker};

/// Per-frame line emitted with `--json`
#[derive(Debug, Serialize)]
struct FrameOutput<'a> {
    frame: u64,
    applied: usize,
    dropped: usize,
    contacts: &'a [ContactSnapshot],
}

/// Totals over a whole replay
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub frames: usize,
    pub applied: usize,
    pub dropped: usize,
}

/// Run every frame of `trace` through `tracker`, printing state after each
pub fn run_replay(tracker: &mut TouchTracker, trace: &Trace, json: bool) -> Result<ReplaySummary> {
    let mut summary = ReplaySummary::default();

    for frame in &trace.frames {
        let report = tracker.apply_frame(frame.events.iter().copied());
        summary.frames += 1;
        summary.applied += report.applied;
        summary.dropped += report.dropped;

        if json {
            let contacts = tracker.snapshot();
            let line = serde_json::to_string(&FrameOutput {
                frame: frame.frame,
                applied: report.applied,
                dropped: report.dropped,
                contacts: &contacts,
            })
            .context("Failed to serialize frame")?;
            println!("{}", line);
        } else {
            println!(
                "\n{} {}",
                "Frame".bold(),
                frame.frame.to_string().bright_white()
            );
            for (event, outcome) in frame.events.iter().zip(&report.outcomes) {
                print_outcome(event, outcome);
            }
            print_points(tracker);
        }
    }

    info!(
        "Replayed {} frames: {} events applied, {} dropped",
        summary.frames, summary.applied, summary.dropped
    );
    Ok(summary)
}

/// Print one event and what it did
pub fn print_outcome(event: &TouchEvent, outcome: &EventOutcome) {
    println!("  {:<40} {}", event.to_string(), describe(outcome));
}

/// Print the tracker's current contacts, ordered by id
pub fn print_points(tracker: &TouchTracker) {
    let contacts = tracker.snapshot();
    if contacts.is_empty() {
        println!("  {}", "no contacts".dimmed());
        return;
    }
    for contact in contacts {
        let flag = if contact.flag {
            "on".green()
        } else {
            "off".dimmed()
        };
        println!(
            "  {} at {} flag={}",
            contact.id.to_string().cyan(),
            contact.position,
            flag
        );
    }
}

fn describe(outcome: &EventOutcome) -> ColoredString {
    match outcome {
        EventOutcome::Registered(id) => format!("registered {}", id).green(),
        EventOutcome::Duplicate(id) => format!("duplicate of {}", id).yellow(),
        EventOutcome::Relocated { id, to } => format!("moved {} to {}", id, to).green(),
        EventOutcome::Stationary(id) => format!("{} stayed put", id).normal(),
        EventOutcome::Collided {
            dropped,
            occupant,
            at,
        } => format!("{} collided with {} at {}", dropped, occupant, at).yellow(),
        EventOutcome::Released(id) => format!("released {}", id).green(),
        EventOutcome::RecoveredAsDown(down) => format!("replayed release -> {:?}", down).yellow(),
        EventOutcome::Dropped(err) => format!("dropped: {}", err).red(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replay_summary() {
        let trace = Trace::from_csv_str(
            "frame,phase,x,y,prev_x,prev_y\n\
             0,down,994,99,,\n\
             1,move,990.71,102.29,994,99\n\
             2,up,50,50,60,60\n",
        )
        .unwrap();
        let mut tracker = TouchTracker::default();

        let summary = run_replay(&mut tracker, &trace, true).unwrap();
        assert_eq!(
            summary,
            ReplaySummary {
                frames: 3,
                applied: 2,
                dropped: 1,
            }
        );
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_describe_dropped() {
        let outcome = EventOutcome::Dropped(touchgrid::TrackerError::UnmatchedEvent {
            previous: touchgrid::GridPoint::new(1, 2),
        });
        assert!(describe(&outcome).contains("no such previous point"));
    }
}
