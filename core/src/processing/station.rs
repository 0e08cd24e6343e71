use log::{debug, info};

use super::reshape::reshape_adjoint;
use super::weights::calculate_channel_weights;
use crate::config::ParameterBundle;
use crate::error::{DataSide, PipelineError, PipelineResult};
use crate::model::{Event, StationAdjoint, StationGroup, StationMetadata, Stream};
use crate::prelude::{FigureOptions, PostprocessRequest, Toolkit, WindowContext};
use crate::time::seconds_between;

/// Run-wide values bound into every station invocation.
#[derive(Debug, Clone)]
pub struct StationContext {
    pub obsd_tag: String,
    pub synt_tag: String,
    pub event: Event,
    pub figure: FigureOptions,
    pub verbose: bool,
}

/// Checks the four station preconditions in a fixed order.
pub fn check_station_pair(
    observed: &dyn StationGroup,
    synthetic: &dyn StationGroup,
    context: &StationContext,
) -> PipelineResult<()> {
    let station = observed.station_name();
    if !observed.has_metadata() {
        return Err(missing_metadata(DataSide::Observed, station));
    }
    if !synthetic.has_metadata() {
        return Err(missing_metadata(DataSide::Synthetic, station));
    }
    if !observed.has_tagged_stream(&context.obsd_tag) {
        return Err(missing_tag(DataSide::Observed, station, &context.obsd_tag));
    }
    if !synthetic.has_tagged_stream(&context.synt_tag) {
        return Err(missing_tag(DataSide::Synthetic, station, &context.synt_tag));
    }
    Ok(())
}

fn missing_metadata(side: DataSide, station: &str) -> PipelineError {
    PipelineError::MissingMetadata {
        side,
        station: station.to_string(),
    }
}

fn missing_tag(side: DataSide, station: &str, tag: &str) -> PipelineError {
    PipelineError::MissingTag {
        side,
        station: station.to_string(),
        tag: tag.to_string(),
    }
}

fn station_parts<'g>(
    group: &'g dyn StationGroup,
    side: DataSide,
    tag: &str,
) -> PipelineResult<(&'g StationMetadata, &'g Stream)> {
    let station = group.station_name();
    let metadata = group
        .metadata()
        .ok_or_else(|| missing_metadata(side, station))?;
    let stream = group
        .tagged_stream(tag)
        .ok_or_else(|| missing_tag(side, station, tag))?;
    Ok((metadata, stream))
}

/// Processes one observed/synthetic station pair into adjoint sources.
///
/// `params` is taken by value: every invocation owns its own copy of the
/// configuration, so stations can run concurrently from one shared bundle.
/// Returns `Ok(None)` when window selection finds nothing to measure.
pub fn process_station(
    observed: &dyn StationGroup,
    synthetic: &dyn StationGroup,
    context: &StationContext,
    params: ParameterBundle,
    toolkit: &Toolkit,
) -> PipelineResult<Option<StationAdjoint>> {
    check_station_pair(observed, synthetic, context)?;
    let station = observed.station_name();
    let (obsd_staxml, observed_stream) = station_parts(observed, DataSide::Observed, &context.obsd_tag)?;
    let (synt_staxml, synthetic_stream) = station_parts(synthetic, DataSide::Synthetic, &context.synt_tag)?;

    // timing reference for the output, captured before any processing
    let raw_synt = synthetic_stream
        .first()
        .cloned()
        .ok_or_else(|| PipelineError::EmptyStream {
            side: DataSide::Synthetic,
            station: station.to_string(),
            tag: context.synt_tag.clone(),
        })?;

    let new_obsd = toolkit
        .processor
        .process(observed_stream, obsd_staxml, &params.proc_obsd)?;
    let new_synt = toolkit
        .processor
        .process(synthetic_stream, synt_staxml, &params.proc_synt)?;

    let windows = toolkit.selector.select(
        &new_obsd,
        &new_synt,
        &params.window,
        WindowContext {
            station: synt_staxml,
            event: &context.event,
            figure: &context.figure,
            verbose: context.verbose,
        },
    )?;
    if windows.is_empty() {
        info!("{}: no windows selected", station);
        return Ok(None);
    }
    let windows = toolkit.transform.transform(windows);
    if context.verbose {
        debug!("{}: {} windows after transform", station, windows.window_count());
    }

    let adjoint_sources = toolkit.calculator.calculate(
        &new_obsd,
        &new_synt,
        &windows,
        &params.adjoint,
        params.adj_src_type,
        &context.figure,
    )?;
    let weights = calculate_channel_weights(&adjoint_sources, &windows);

    let request = PostprocessRequest {
        timing: raw_synt.stats,
        channel_prefix: raw_synt.id.channel_prefix(),
        inventory: synt_staxml,
        event: &context.event,
        weights: &weights,
        pre_filt: params.proc_obsd.pre_filt,
    };
    let adjoint_sources = toolkit.postprocessor.postprocess(adjoint_sources, &request)?;

    let origin = context
        .event
        .reference_origin()
        .ok_or_else(|| PipelineError::NoOrigin(context.event.resource_id.clone()))?;
    let time_offset = seconds_between(raw_synt.stats.starttime, origin.time);

    Ok(Some(reshape_adjoint(adjoint_sources, time_offset, synt_staxml)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StationRecord;
    use crate::testing::{bundle, event_at, station_pair, t0, Recorders, OBSD_TAG, SYNT_TAG};
    use crate::time::add_seconds;
    use std::sync::atomic::Ordering;

    fn context() -> StationContext {
        StationContext {
            obsd_tag: OBSD_TAG.to_string(),
            synt_tag: SYNT_TAG.to_string(),
            event: event_at(t0(), 10.0, 20.0),
            figure: FigureOptions::disabled(),
            verbose: false,
        }
    }

    #[test]
    fn output_timing_follows_raw_synthetic() {
        let recorders = Recorders::new(false);
        let (observed, synthetic) = station_pair("ANMO", add_seconds(t0(), 5.0));
        let raw = synthetic.streams[SYNT_TAG].traces[0].stats;

        let result = process_station(&observed, &synthetic, &context(), bundle(), &recorders.toolkit())
            .unwrap()
            .expect("windows were selected");

        // the mock processor halved the sampling, the output must not follow it
        assert!(!result.records.is_empty());
        for record in &result.records {
            assert_eq!(record.parameters.starttime, raw.starttime);
            assert_eq!(record.parameters.dt, raw.delta);
            assert_eq!(record.data.len(), raw.npts);
        }
        assert_eq!(recorders.postprocessor.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn time_offset_is_raw_start_minus_origin() {
        let recorders = Recorders::new(false);
        let (observed, synthetic) = station_pair("ANMO", add_seconds(t0(), 5.0));
        let result = process_station(&observed, &synthetic, &context(), bundle(), &recorders.toolkit())
            .unwrap()
            .unwrap();
        assert!(result
            .records
            .iter()
            .all(|record| record.parameters.time_offset == 5.0));
    }

    #[test]
    fn preferred_origin_drives_time_offset() {
        let recorders = Recorders::new(false);
        let (observed, synthetic) = station_pair("ANMO", add_seconds(t0(), 5.0));
        let mut ctx = context();
        let mut preferred = ctx.event.origins[0].clone();
        preferred.time = add_seconds(t0(), 2.0);
        ctx.event.origins.push(preferred);
        ctx.event.preferred_origin = Some(1);

        let result = process_station(&observed, &synthetic, &ctx, bundle(), &recorders.toolkit())
            .unwrap()
            .unwrap();
        assert_eq!(result.records[0].parameters.time_offset, 3.0);
    }

    #[test]
    fn empty_window_set_short_circuits() {
        let recorders = Recorders::new(true);
        let (observed, synthetic) = station_pair("ANMO", t0());
        let result =
            process_station(&observed, &synthetic, &context(), bundle(), &recorders.toolkit()).unwrap();

        assert!(result.is_none());
        assert_eq!(recorders.processor.calls.load(Ordering::SeqCst), 2);
        assert_eq!(recorders.selector.calls.load(Ordering::SeqCst), 1);
        assert_eq!(recorders.calculator.calls.load(Ordering::SeqCst), 0);
        assert_eq!(recorders.postprocessor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn each_missing_precondition_is_reported_distinctly() {
        let recorders = Recorders::new(false);
        let toolkit = recorders.toolkit();
        let (observed, synthetic) = station_pair("ANMO", t0());

        let mut no_obsd_meta = observed.clone();
        no_obsd_meta.metadata = None;
        let err = process_station(&no_obsd_meta, &synthetic, &context(), bundle(), &toolkit).unwrap_err();
        assert!(matches!(err, PipelineError::MissingMetadata { side: DataSide::Observed, .. }));

        let mut no_synt_meta = synthetic.clone();
        no_synt_meta.metadata = None;
        let err = process_station(&observed, &no_synt_meta, &context(), bundle(), &toolkit).unwrap_err();
        assert!(matches!(err, PipelineError::MissingMetadata { side: DataSide::Synthetic, .. }));
        assert_eq!(err.to_string(), "synt station group 'IU.ANMO' missing 'StationXML'");

        let mut no_obsd_tag = observed.clone();
        no_obsd_tag.streams.clear();
        let err = process_station(&no_obsd_tag, &synthetic, &context(), bundle(), &toolkit).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingTag { side: DataSide::Observed, ref tag, .. } if tag == OBSD_TAG
        ));

        let mut no_synt_tag = synthetic.clone();
        no_synt_tag.streams.clear();
        let err = process_station(&observed, &no_synt_tag, &context(), bundle(), &toolkit).unwrap_err();
        assert!(matches!(
            err,
            PipelineError::MissingTag { side: DataSide::Synthetic, ref tag, .. } if tag == SYNT_TAG
        ));

        // nothing ran for any of the rejected pairs
        assert_eq!(recorders.processor.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_synthetic_stream_is_rejected() {
        let recorders = Recorders::new(false);
        let (observed, _) = station_pair("ANMO", t0());
        let synthetic = StationRecord::new("IU.ANMO")
            .with_metadata(observed.metadata.clone().unwrap())
            .with_stream(SYNT_TAG, Stream::default());
        let err = process_station(&observed, &synthetic, &context(), bundle(), &recorders.toolkit())
            .unwrap_err();
        assert!(matches!(err, PipelineError::EmptyStream { .. }));
    }

    #[test]
    fn per_station_overrides_do_not_leak() {
        let recorders = Recorders::new(false);
        let toolkit = recorders.toolkit();
        let shared = bundle();
        let original_pre_filt = shared.proc_obsd.pre_filt;

        let mut first = shared.clone();
        first.proc_obsd.pre_filt = Some([0.001, 0.002, 0.2, 0.3]);
        first.proc_obsd.water_level = Some(60.0);
        let (obsd_a, synt_a) = station_pair("ANMO", t0());
        process_station(&obsd_a, &synt_a, &context(), first, &toolkit).unwrap();

        let (obsd_b, synt_b) = station_pair("COLA", t0());
        process_station(&obsd_b, &synt_b, &context(), shared.clone(), &toolkit).unwrap();

        let seen = recorders.processor.seen.lock().unwrap();
        // calls alternate observed, synthetic per station
        assert_eq!(seen[0].pre_filt, Some([0.001, 0.002, 0.2, 0.3]));
        assert_eq!(seen[2].pre_filt, original_pre_filt);
        assert_eq!(seen[2].water_level, None);
        assert_eq!(shared.proc_obsd.pre_filt, original_pre_filt);
        assert_eq!(shared, bundle());
    }
}
