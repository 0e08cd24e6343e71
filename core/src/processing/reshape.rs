use crate::model::{
    AdjointRecord, AdjointRecordParameters, AdjointSource, StationAdjoint, StationMetadata,
};

const ADJOINT_UNITS: &str = "m";

/// Lays postprocessed adjoint sources out as per-channel output records.
pub fn reshape_adjoint(
    adjoint_sources: Vec<AdjointSource>,
    time_offset: f64,
    station: &StationMetadata,
) -> StationAdjoint {
    let records = adjoint_sources
        .into_iter()
        .map(|source| {
            let path = format!(
                "{}_{}_{}",
                source.id.network, source.id.station, source.id.channel
            );
            let parameters = AdjointRecordParameters {
                adjoint_source_type: source.adj_src_type,
                misfit: source.misfit,
                dt: source.dt,
                starttime: source.starttime,
                time_offset,
                station_id: format!("{}.{}", source.id.network, source.id.station),
                component: source.id.channel.clone(),
                location: source.id.location.clone(),
                latitude: station.latitude,
                longitude: station.longitude,
                elevation_in_m: station.elevation_m,
                depth_in_m: station.local_depth_m,
                units: ADJOINT_UNITS.to_string(),
            };
            AdjointRecord {
                path,
                data: source.data,
                parameters,
            }
        })
        .collect();

    StationAdjoint {
        station_id: station.station_id(),
        records,
    }
}
