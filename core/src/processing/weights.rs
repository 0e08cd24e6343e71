use std::collections::BTreeSet;

use crate::model::{AdjointSource, ChannelWeights, WindowSet};

/// Weights each channel by its share of the windows picked on its component.
///
/// Only channels that produced an adjoint source take part.
pub fn calculate_channel_weights(adjoint_sources: &[AdjointSource], windows: &WindowSet) -> ChannelWeights {
    let with_adjoint: BTreeSet<String> = adjoint_sources
        .iter()
        .map(|source| source.id.to_string())
        .collect();

    let mut weights = ChannelWeights::default();
    for (channel_id, picks) in windows.iter() {
        if picks.is_empty() || !with_adjoint.contains(channel_id) {
            continue;
        }
        let Some(component) = channel_id.chars().last() else {
            continue;
        };
        weights
            .components
            .entry(component)
            .or_default()
            .insert(channel_id.clone(), picks.len() as f64);
    }

    for channels in weights.components.values_mut() {
        let total: f64 = channels.values().sum();
        for weight in channels.values_mut() {
            *weight /= total;
        }
    }
    weights
}
