use std::collections::BTreeMap;
use std::path::Path;

use hdf5::Dataset;
use hdf5::File;
use hdf5::Group;
use hdf5::types::TypeDescriptor;
use hdf5::types::VarLenAscii;
use hdf5::types::VarLenUnicode;
use tracing::debug;
use tracing::warn;

use crate::AttributeValue;
use crate::ContainerError;
use crate::RawEpisode;
use crate::SegmentBound;

const FRAMES_DATASET: &str = "action";
const TIMESTAMP_DATASETS: &[&str] = &["timestamp", "timestamps", "observations/timestamp"];
const SEGMENT_DATASET: &str = "label/task_timestep";

/// Reads one container. The file handle lives only for the duration of this
/// call and is closed when `file` drops, including on every error path.
///
/// Only a container that cannot be opened, or whose attribute block cannot be
/// listed, is an error. Optional datasets holding values that do not decode
/// as numbers are degraded and logged.
pub(crate) fn read_episode(path: &Path) -> Result<RawEpisode, ContainerError> {
    let file = File::open(path).map_err(|err| ContainerError::Open {
        path: path.to_path_buf(),
        message: err.to_string(),
    })?;

    let frame_count = dataset_if_present(&file, FRAMES_DATASET)
        .map(|dataset| dataset.shape().first().copied().unwrap_or(0) as u64);

    let timestamps = TIMESTAMP_DATASETS
        .iter()
        .find_map(|name| dataset_if_present(&file, name).map(|dataset| (*name, dataset)))
        .and_then(|(name, dataset)| match read_numeric(&dataset) {
            Ok(values) => Some(values),
            Err(err) => {
                warn!("ignoring unreadable `{name}` in {}: {err}", path.display());
                None
            }
        });

    let segment_bounds = dataset_if_present(&file, SEGMENT_DATASET).map(|dataset| {
        read_segment_bounds(&dataset).unwrap_or_else(|err| {
            warn!(
                "`{SEGMENT_DATASET}` in {} is not numeric ({err}); counting its rows",
                path.display()
            );
            markers_from_shape(&dataset)
        })
    });

    let attributes = read_attributes(&file).map_err(|err| ContainerError::Read {
        path: path.to_path_buf(),
        name: "attributes".to_string(),
        message: err.to_string(),
    })?;

    Ok(RawEpisode {
        frame_count,
        timestamps,
        segment_bounds,
        attributes: Some(attributes),
    })
}

/// Resolves a `/`-separated dataset path, checking each intermediate link so
/// a missing group reads as "absent" rather than as an error.
fn dataset_if_present(root: &Group, path: &str) -> Option<Dataset> {
    let mut prefix = String::new();
    for part in path.split('/') {
        if !prefix.is_empty() {
            prefix.push('/');
        }
        prefix.push_str(part);
        if !root.link_exists(&prefix) {
            return None;
        }
    }
    root.dataset(path).ok()
}

fn read_numeric(dataset: &Dataset) -> hdf5::Result<Vec<f64>> {
    let values = match dataset.dtype()?.to_descriptor()? {
        TypeDescriptor::Integer(_) => dataset
            .read_raw::<i64>()?
            .into_iter()
            .map(|value| value as f64)
            .collect(),
        TypeDescriptor::Unsigned(_) => dataset
            .read_raw::<u64>()?
            .into_iter()
            .map(|value| value as f64)
            .collect(),
        _ => dataset.read_raw::<f64>()?,
    };
    Ok(values)
}

fn read_segment_bounds(dataset: &Dataset) -> hdf5::Result<Vec<SegmentBound>> {
    let shape = dataset.shape();
    let values: Vec<u64> = read_numeric(dataset)?
        .into_iter()
        .map(|value| {
            if value.is_finite() && value > 0.0 {
                value as u64
            } else {
                0
            }
        })
        .collect();

    let bounds = match shape.as_slice() {
        [_, 2] => values
            .chunks_exact(2)
            .map(|pair| SegmentBound::range(pair[0], pair[1]))
            .collect(),
        // Wider rows only carry their start frame in the first column.
        [_, width] if *width > 0 => values
            .chunks_exact(*width)
            .map(|row| SegmentBound::starting_at(row[0]))
            .collect(),
        _ => values.into_iter().map(SegmentBound::starting_at).collect(),
    };
    Ok(bounds)
}

/// One start-only marker per row, at frames `0..rows`.
fn markers_from_shape(dataset: &Dataset) -> Vec<SegmentBound> {
    let rows = dataset.shape().first().copied().unwrap_or(0) as u64;
    (0..rows).map(SegmentBound::starting_at).collect()
}

fn read_attributes(file: &File) -> hdf5::Result<BTreeMap<String, AttributeValue>> {
    let mut attributes = BTreeMap::new();
    for name in file.attr_names()? {
        let attr = match file.attr(&name) {
            Ok(attr) => attr,
            Err(err) => {
                debug!("skipping unreadable attribute `{name}`: {err}");
                continue;
            }
        };
        if attr.ndim() != 0 {
            debug!("skipping non-scalar attribute `{name}`");
            continue;
        }
        let value = match attr.dtype().and_then(|dtype| dtype.to_descriptor()) {
            Ok(TypeDescriptor::VarLenUnicode) => attr
                .read_scalar::<VarLenUnicode>()
                .map(|text| AttributeValue::Text(text.as_str().to_string())),
            Ok(TypeDescriptor::VarLenAscii) => attr
                .read_scalar::<VarLenAscii>()
                .map(|text| AttributeValue::Text(text.as_str().to_string())),
            Ok(TypeDescriptor::Integer(_)) => attr
                .read_scalar::<i64>()
                .map(|value| AttributeValue::Number(value as f64)),
            Ok(TypeDescriptor::Unsigned(_)) => attr
                .read_scalar::<u64>()
                .map(|value| AttributeValue::Number(value as f64)),
            Ok(TypeDescriptor::Float(_)) => attr.read_scalar::<f64>().map(AttributeValue::Number),
            Ok(other) => {
                debug!("skipping attribute `{name}` with unsupported type {other:?}");
                continue;
            }
            Err(err) => Err(err),
        };
        match value {
            Ok(value) => {
                attributes.insert(name, value);
            }
            Err(err) => debug!("skipping unreadable attribute `{name}`: {err}"),
        }
    }
    Ok(attributes)
}
