//! Zero-run collapsing
//!
//! Runs of at least `MIN_ZERO_RUN` exact zeros are cut out of the residual
//! stream and replaced by (offset, length) descriptors. Shorter runs stay in
//! the stream as literal zeros.

use crate::core::{SsafError, SsafResult, ZeroRun, MIN_ZERO_RUN};

/// split residuals into descriptors and the compacted stream
pub fn encode_zero_runs(residuals: &[i32]) -> (Vec<ZeroRun>, Vec<i32>) {
    let mut runs = Vec::new();
    let mut compacted = Vec::with_capacity(residuals.len());

    let mut run_start = 0usize;
    let mut run_len = 0usize;

    for (i, &value) in residuals.iter().enumerate() {
        if value == 0 {
            if run_len == 0 {
                run_start = i;
            }
            run_len += 1;
            continue;
        }

        flush_run(&mut runs, &mut compacted, run_start, run_len);
        run_len = 0;
        compacted.push(value);
    }

    // stream may end inside a run
    flush_run(&mut runs, &mut compacted, run_start, run_len);

    (runs, compacted)
}

fn flush_run(runs: &mut Vec<ZeroRun>, compacted: &mut Vec<i32>, start: usize, len: usize) {
    if len >= MIN_ZERO_RUN {
        runs.push(ZeroRun::new(start as u32, len as u32));
    } else {
        compacted.extend(std::iter::repeat(0).take(len));
    }
}

/// re-insert the zero runs, producing `total_len` residuals
pub fn decode_zero_runs(runs: &[ZeroRun], compacted: &[i32], total_len: usize) -> SsafResult<Vec<i32>> {
    let removed = check_runs(runs, total_len)?;
    if compacted.len() + removed != total_len {
        return Err(SsafError::format(format!(
            "{} encoded samples and {} run zeros do not add up to {} samples",
            compacted.len(),
            removed,
            total_len
        )));
    }

    let mut residuals = Vec::with_capacity(total_len);
    let mut literals = compacted.iter().copied();

    for run in runs {
        // literals up to the start of this run
        let gap = run.offset as usize - residuals.len();
        residuals.extend(literals.by_ref().take(gap));
        residuals.extend(std::iter::repeat(0).take(run.length as usize));
    }
    residuals.extend(literals);

    Ok(residuals)
}

/// descriptors must be non-empty, ascending, non-overlapping and in bounds;
/// returns the total number of zeros they stand for
fn check_runs(runs: &[ZeroRun], total_len: usize) -> SsafResult<usize> {
    let mut cursor = 0u64;
    let mut removed = 0usize;

    for run in runs {
        if run.length == 0 {
            return Err(SsafError::format(format!("Empty zero run at offset {}", run.offset)));
        }
        if (run.offset as u64) < cursor {
            return Err(SsafError::format(format!(
                "Zero run at offset {} overlaps or precedes the previous run",
                run.offset
            )));
        }
        if run.end() > total_len as u64 {
            return Err(SsafError::format(format!(
                "Zero run {}+{} runs past {} samples",
                run.offset, run.length, total_len
            )));
        }
        cursor = run.end();
        removed += run.length as usize;
    }

    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_run_becomes_descriptor() {
        let mut residuals = vec![3, -1];
        residuals.extend(vec![0; 12]);
        let (runs, compacted) = encode_zero_runs(&residuals);
        assert_eq!(runs, vec![ZeroRun::new(2, 12)]);
        assert_eq!(compacted, vec![3, -1]);
    }

    #[test]
    fn overlapping_runs_are_rejected() {
        let runs = [ZeroRun::new(0, 10), ZeroRun::new(5, 10)];
        let err = decode_zero_runs(&runs, &[], 20).unwrap_err();
        assert!(err.is_format_error());
    }
}
