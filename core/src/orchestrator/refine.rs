use log::warn;

use super::archive::Archive;
use crate::config::{ParameterBundle, ProcessParams};
use crate::error::{ArchiveError, PipelineError, PipelineResult};
use crate::model::Event;
use crate::time::add_seconds;

/// The authoritative event of a run is the first one in the archive catalog.
pub fn select_event(archive: &dyn Archive) -> Result<&Event, ArchiveError> {
    let events = archive.events();
    if events.len() > 1 {
        warn!(
            "{} holds {} events, using the first ({})",
            archive.path().display(),
            events.len(),
            events[0].resource_id
        );
    }
    events
        .first()
        .ok_or_else(|| ArchiveError::NoEvents(archive.path().to_path_buf()))
}

/// Turns the relative cut times into absolute ones and injects the event location.
pub fn refine_process_params(params: &mut ProcessParams, event: &Event) -> PipelineResult<()> {
    let origin = event
        .reference_origin()
        .ok_or_else(|| PipelineError::NoOrigin(event.resource_id.clone()))?;
    params.starttime = Some(add_seconds(origin.time, params.relative_starttime));
    params.endtime = Some(add_seconds(origin.time, params.relative_endtime));
    params.event_latitude = Some(origin.latitude);
    params.event_longitude = Some(origin.longitude);
    Ok(())
}

/// Refines the observed and synthetic processing configs independently.
pub fn refine_param(params: &mut ParameterBundle, event: &Event) -> PipelineResult<()> {
    refine_process_params(&mut params.proc_obsd, event)?;
    refine_process_params(&mut params.proc_synt, event)
}
