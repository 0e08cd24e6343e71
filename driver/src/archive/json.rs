use adjcore::error::ArchiveError;
use adjcore::model::{Event, StationAdjoint, StationGroup, StationRecord};
use adjcore::orchestrator::{Archive, ArchiveReader, OutputWriter};
use log::info;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// On-disk layout of an input waveform archive.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ArchiveDocument {
    pub events: Vec<Event>,
    #[serde(default)]
    pub stations: Vec<StationRecord>,
}

/// On-disk layout of the adjoint output: the event plus every station's records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdjointDocument {
    pub event: Event,
    pub stations: Vec<StationAdjoint>,
}

fn io_error(path: &Path) -> impl FnOnce(std::io::Error) -> ArchiveError + '_ {
    move |source| ArchiveError::Io {
        path: path.to_path_buf(),
        source,
    }
}

fn format_error(path: &Path) -> impl FnOnce(serde_json::Error) -> ArchiveError + '_ {
    move |err| ArchiveError::Format {
        path: path.to_path_buf(),
        message: err.to_string(),
    }
}

/// Archive backed by a single JSON document, fully loaded on open.
#[derive(Debug)]
pub struct JsonArchive {
    path: PathBuf,
    document: ArchiveDocument,
}

impl JsonArchive {
    pub fn load(path: &Path) -> Result<Self, ArchiveError> {
        let file = File::open(path).map_err(io_error(path))?;
        let document: ArchiveDocument =
            serde_json::from_reader(BufReader::new(file)).map_err(format_error(path))?;
        check_sample_counts(path, &document)?;
        info!(
            "loaded {} ({} events, {} stations)",
            path.display(),
            document.events.len(),
            document.stations.len()
        );
        Ok(Self {
            path: path.to_path_buf(),
            document,
        })
    }

    pub fn save(path: &Path, document: &ArchiveDocument) -> Result<(), ArchiveError> {
        write_json(path, document)
    }
}

impl Archive for JsonArchive {
    fn path(&self) -> &Path {
        &self.path
    }

    fn events(&self) -> &[Event] {
        &self.document.events
    }

    fn station_names(&self) -> Vec<String> {
        self.document
            .stations
            .iter()
            .map(|station| station.name.clone())
            .collect()
    }

    fn station(&self, name: &str) -> Option<&dyn StationGroup> {
        self.document
            .stations
            .iter()
            .find(|station| station.name == name)
            .map(|station| station as &dyn StationGroup)
    }
}

/// Every trace must carry exactly `npts` samples.
fn check_sample_counts(path: &Path, document: &ArchiveDocument) -> Result<(), ArchiveError> {
    for station in &document.stations {
        for (tag, stream) in &station.streams {
            if let Some(trace) = stream.iter().find(|trace| trace.stats.npts != trace.data.len()) {
                return Err(ArchiveError::Format {
                    path: path.to_path_buf(),
                    message: format!(
                        "{} [{}] {}: npts is {} but {} samples are stored",
                        station.name,
                        tag,
                        trace.id,
                        trace.stats.npts,
                        trace.data.len()
                    ),
                });
            }
        }
    }
    Ok(())
}

pub struct JsonArchiveReader;

impl ArchiveReader for JsonArchiveReader {
    fn open(&self, path: &Path) -> Result<Box<dyn Archive>, ArchiveError> {
        Ok(Box::new(JsonArchive::load(path)?))
    }
}

/// Writes the collected adjoint records as one JSON document, stations sorted by id.
pub struct JsonArchiveWriter;

impl JsonArchiveWriter {
    #[allow(dead_code)]
    pub fn read(path: &Path) -> Result<AdjointDocument, ArchiveError> {
        let file = File::open(path).map_err(io_error(path))?;
        serde_json::from_reader(BufReader::new(file)).map_err(format_error(path))
    }
}

impl OutputWriter for JsonArchiveWriter {
    fn write(&self, output: &Path, event: &Event, results: &[StationAdjoint]) -> Result<(), ArchiveError> {
        let mut stations = results.to_vec();
        stations.sort_by(|a, b| a.station_id.cmp(&b.station_id));
        let document = AdjointDocument {
            event: event.clone(),
            stations,
        };
        write_json(output, &document)?;
        info!(
            "wrote {} station(s) to {}",
            document.stations.len(),
            output.display()
        );
        Ok(())
    }
}

fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<(), ArchiveError> {
    if let Some(parent) = path.parent().filter(|dir| !dir.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(io_error(path))?;
    }
    let file = File::create(path).map_err(io_error(path))?;
    serde_json::to_writer_pretty(BufWriter::new(file), value).map_err(format_error(path))
}
