/// Layout of a tail-merged block, in seconds relative to its start.
#[derive(Clone, Debug, PartialEq)]
pub struct TailMergePlan {
    /// Where the last content clip's visuals stop (`D - E`).
    pub visual_cut: f64,
    /// Start of each ending segment's visuals.
    pub ending_offsets: Vec<f64>,
    /// Whole block length; equals the content clip's duration `D`, which its audio spans.
    pub duration: f64,
}

impl TailMergePlan {
    /// Which part of the block is on screen at `local` seconds: `None` for the content clip, or
    /// `Some((ending, seconds into that ending))`.
    pub fn locate(&self, local: f64) -> Option<(usize, f64)> {
        if local < self.visual_cut {
            return None;
        }
        let k = self
            .ending_offsets
            .iter()
            .rposition(|&off| off <= local)
            .unwrap_or(0);
        Some((k, local - self.ending_offsets[k]))
    }
}

/// Why a tail merge was not performed.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
pub enum MergeInfeasible {
    #[error("no ending segments to merge")]
    NoEndings,
    #[error("no content segment to merge into")]
    NoContent,
    #[error("endings last {endings:.2}s but the last content clip only {content:.2}s")]
    EndingsTooLong { endings: f64, content: f64 },
}

/// Plan the splice of endings lasting `ending_durations` into the last `content_duration`
/// seconds of the last content clip. Requires `sum(endings) <= content_duration`.
pub fn plan_tail_merge(
    content_duration: Option<f64>,
    ending_durations: &[f64],
) -> Result<TailMergePlan, MergeInfeasible> {
    let content = content_duration.ok_or(MergeInfeasible::NoContent)?;
    if ending_durations.is_empty() {
        return Err(MergeInfeasible::NoEndings);
    }
    let endings: f64 = ending_durations.iter().sum();
    if endings > content {
        return Err(MergeInfeasible::EndingsTooLong { endings, content });
    }

    let visual_cut = content - endings;
    let mut offsets = Vec::with_capacity(ending_durations.len());
    let mut at = visual_cut;
    for d in ending_durations {
        offsets.push(at);
        at += d;
    }
    Ok(TailMergePlan {
        visual_cut,
        ending_offsets: offsets,
        duration: content,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/timeline/tail_merge.rs"]
mod tests;
