use crate::error::{GaitError, Result};
use crate::{StanceInterval, StepInterval};
use log::debug;

/// Smallest gap between one stance's end and the next stance's start.
///
/// Taking the minimum keeps every extended step short of its successor's
/// stance.
pub fn swing_phase_interval_size(stances: &[StanceInterval]) -> Result<usize> {
    stances
        .windows(2)
        .map(|pair| pair[1].start - pair[0].end)
        .min()
        .ok_or(GaitError::InsufficientIntervals {
            required: 2,
            found: stances.len(),
        })
}

/// Extend every stance by the shared swing-phase size.
///
/// The last stance has no successor to measure against and reuses the same
/// size. Returns the swing size alongside the steps.
pub fn get_step_intervals(stances: &[StanceInterval]) -> Result<(usize, Vec<StepInterval>)> {
    let swing = swing_phase_interval_size(stances)?;
    debug!("Swing phase interval size: {} samples", swing);

    let steps = stances
        .iter()
        .map(|stance| StepInterval::new(stance.start, stance.end + swing))
        .collect();

    Ok((swing, steps))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn two_stances_share_the_gap() {
        let stances = vec![StanceInterval::new(0, 149), StanceInterval::new(300, 449)];
        let (swing, steps) = get_step_intervals(&stances).unwrap();
        assert_eq!(swing, 151);
        assert_eq!(
            steps,
            vec![StepInterval::new(0, 300), StepInterval::new(300, 600)]
        );
    }

    #[test]
    fn minimum_gap_is_used_for_every_step() {
        let stances = vec![
            StanceInterval::new(0, 120),
            StanceInterval::new(300, 420),
            StanceInterval::new(500, 640),
            StanceInterval::new(900, 1010),
        ];
        let (swing, steps) = get_step_intervals(&stances).unwrap();
        assert_eq!(swing, 80);
        assert_eq!(steps.len(), stances.len());
        for (stance, step) in stances.iter().zip(&steps) {
            assert_eq!(step.start, stance.start);
            assert_eq!(step.end, stance.end + swing);
        }
    }

    #[test]
    fn fewer_than_two_stances_fail() {
        assert_eq!(
            get_step_intervals(&[StanceInterval::new(0, 200)]),
            Err(GaitError::InsufficientIntervals {
                required: 2,
                found: 1
            })
        );
        assert_eq!(
            swing_phase_interval_size(&[]),
            Err(GaitError::InsufficientIntervals {
                required: 2,
                found: 0
            })
        );
    }
}
