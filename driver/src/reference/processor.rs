use adjcore::config::ProcessParams;
use adjcore::error::CollaboratorError;
use adjcore::math::fft::apply_pre_filter;
use adjcore::math::{interpolate_onto, StatsHelper};
use adjcore::model::{StationMetadata, Stream, Trace, TraceStats};
use adjcore::prelude::{CollaboratorResult, SignalProcessor};
use adjcore::time::{add_seconds, seconds_between};
use std::f64::consts::PI;

/// Cuts each trace to the refined window, demeans, tapers, optionally
/// band-limits with the pre-filter and resamples.
///
/// Instrument response removal and rotation are not modelled: the demo
/// archives already hold ground motion in the ZRT frame.
#[derive(Debug, Default)]
pub struct CutProcessor;

impl SignalProcessor for CutProcessor {
    fn process(
        &self,
        stream: &Stream,
        _inventory: &StationMetadata,
        params: &ProcessParams,
    ) -> CollaboratorResult<Stream> {
        let traces = stream
            .iter()
            .map(|trace| process_trace(trace, params))
            .collect::<CollaboratorResult<Vec<_>>>()?;
        Ok(Stream::new(traces))
    }
}

fn process_trace(trace: &Trace, params: &ProcessParams) -> CollaboratorResult<Trace> {
    let delta = trace.stats.delta;
    if delta <= 0.0 {
        return Err(CollaboratorError::Processing(format!(
            "{} has a non-positive sample interval",
            trace.id
        )));
    }

    let (first, last) = cut_range(trace, params);
    if first >= last {
        return Err(CollaboratorError::Processing(format!(
            "{} has no samples inside the requested time window",
            trace.id
        )));
    }
    let starttime = add_seconds(trace.stats.starttime, first as f64 * delta);
    let mut data = trace.data[first..last].to_vec();

    let mean = StatsHelper::mean(&data);
    data.iter_mut().for_each(|sample| *sample -= mean);
    hann_taper(&mut data, params.taper_percentage);

    if params.filter_flag {
        if let Some(corners) = params.pre_filt {
            data = apply_pre_filter(&data, delta, corners);
        }
    }

    if params.resample_flag && params.sampling_rate > 0.0 {
        let target_delta = 1.0 / params.sampling_rate;
        let span = delta * (data.len() - 1) as f64;
        let target = TraceStats {
            starttime,
            delta: target_delta,
            npts: (span / target_delta).floor() as usize + 1,
        };
        let resampled = interpolate_onto(&data, starttime, delta, &target);
        return Ok(Trace::new(trace.id.clone(), starttime, target_delta, resampled));
    }

    Ok(Trace::new(trace.id.clone(), starttime, delta, data))
}

/// Sample range `[first, last)` covered by the refined start/end times.
fn cut_range(trace: &Trace, params: &ProcessParams) -> (usize, usize) {
    let npts = trace.data.len();
    let delta = trace.stats.delta;
    let first = params
        .starttime
        .map(|start| seconds_between(start, trace.stats.starttime) / delta)
        .map(|index| index.ceil().max(0.0) as usize)
        .unwrap_or(0)
        .min(npts);
    let last = params
        .endtime
        .map(|end| seconds_between(end, trace.stats.starttime) / delta)
        .map(|index| (index.floor() + 1.0).max(0.0) as usize)
        .unwrap_or(npts)
        .min(npts);
    (first, last)
}

/// Symmetric Hann taper over `percentage` of the trace at each end.
fn hann_taper(data: &mut [f64], percentage: f64) {
    let width = ((data.len() as f64) * percentage.clamp(0.0, 0.5)).floor() as usize;
    if width == 0 {
        return;
    }
    let len = data.len();
    for index in 0..width {
        let weight = 0.5 * (1.0 - (PI * index as f64 / width as f64).cos());
        data[index] *= weight;
        data[len - 1 - index] *= weight;
    }
}
