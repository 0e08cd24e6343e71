use log::debug;
use std::collections::BTreeMap;

use crate::error::CollaboratorError;
use crate::math::fft::apply_pre_filter;
use crate::math::{interpolate_onto, MatrixHelper};
use crate::model::AdjointSource;
use crate::prelude::{AdjointPostprocessor, CollaboratorResult, PostprocessRequest};

/// Default postprocessing chain.
///
/// Every adjoint source is interpolated onto the raw synthetic timing, the
/// weighted contributions of each component are summed onto one channel,
/// radial/transverse pairs are rotated to north/east, and the pre-filter
/// taper is applied last.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardPostprocessor;

impl AdjointPostprocessor for StandardPostprocessor {
    fn postprocess(
        &self,
        adjoint_sources: Vec<AdjointSource>,
        request: &PostprocessRequest<'_>,
    ) -> CollaboratorResult<Vec<AdjointSource>> {
        let summed = sum_on_components(adjoint_sources, request);
        let mut rotated = rotate_to_geographic(summed, request)?;

        if let Some(corners) = request.pre_filt {
            for source in rotated.iter_mut() {
                source.data = apply_pre_filter(&source.data, source.dt, corners);
            }
        }
        Ok(rotated)
    }
}

fn sum_on_components(
    adjoint_sources: Vec<AdjointSource>,
    request: &PostprocessRequest<'_>,
) -> BTreeMap<char, AdjointSource> {
    let timing = request.timing;
    let mut by_component: BTreeMap<char, AdjointSource> = BTreeMap::new();

    for source in adjoint_sources {
        let Some(component) = source.id.component() else {
            continue;
        };
        let channel_id = source.id.to_string();
        let weight = request.weights.weight(&channel_id).unwrap_or(1.0);
        debug!("adjoint {} weight {:.3}", channel_id, weight);
        let samples = interpolate_onto(&source.data, source.starttime, source.dt, &timing);

        let entry = by_component.entry(component).or_insert_with(|| AdjointSource {
            id: source
                .id
                .with_channel(format!("{}{}", request.channel_prefix, component)),
            adj_src_type: source.adj_src_type,
            misfit: 0.0,
            starttime: timing.starttime,
            dt: timing.delta,
            min_period: source.min_period,
            max_period: source.max_period,
            data: vec![0.0; timing.npts],
        });
        entry.misfit += weight * source.misfit;
        for (total, value) in entry.data.iter_mut().zip(samples) {
            *total += weight * value;
        }
    }
    by_component
}

fn rotate_to_geographic(
    mut by_component: BTreeMap<char, AdjointSource>,
    request: &PostprocessRequest<'_>,
) -> CollaboratorResult<Vec<AdjointSource>> {
    let radial = by_component.remove(&'R');
    let transverse = by_component.remove(&'T');
    let mut output: Vec<AdjointSource> = by_component.into_values().collect();

    let template = match (&radial, &transverse) {
        (Some(source), _) | (None, Some(source)) => source.clone(),
        (None, None) => return Ok(output),
    };

    let origin = request.event.reference_origin().ok_or_else(|| {
        CollaboratorError::Postprocess(format!(
            "event '{}' has no origin to rotate against",
            request.event.resource_id
        ))
    })?;
    let baz = MatrixHelper::back_azimuth(
        request.inventory.latitude,
        request.inventory.longitude,
        origin.latitude,
        origin.longitude,
    );

    let empty = Vec::new();
    let (north, east) = MatrixHelper::rotate_rt_ne(
        radial.as_ref().map(|s| &s.data).unwrap_or(&empty),
        transverse.as_ref().map(|s| &s.data).unwrap_or(&empty),
        baz,
    );
    let misfit = radial.as_ref().map_or(0.0, |s| s.misfit) + transverse.as_ref().map_or(0.0, |s| s.misfit);

    for (orientation, data) in [('N', north), ('E', east)] {
        let mut rotated = template.clone();
        rotated.id = template
            .id
            .with_channel(format!("{}{}", request.channel_prefix, orientation));
        // the misfit of the pair is carried once, on the north channel
        rotated.misfit = if orientation == 'N' { misfit } else { 0.0 };
        rotated.data = data;
        output.push(rotated);
    }
    output.sort_by(|a, b| a.id.channel.cmp(&b.id.channel));
    Ok(output)
}
