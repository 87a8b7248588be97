use std::fs;

use aloha_container::SegmentBound;
use aloha_summary::EmptyFolderPolicy;
use aloha_summary::Error;
use aloha_summary::MetaConfig;
use aloha_summary::output::FOLDER_CSV_FILE_NAME;
use aloha_summary::output::write_folder_csv;
use pretty_assertions::assert_eq;
use tempfile::tempdir;

use super::fixtures::episode;
use super::fixtures::folder_aggregator;
use super::fixtures::write_episode;
use super::fixtures::write_garbage;

#[test]
fn three_containers_at_ten_fps_total_one_minute() -> anyhow::Result<()> {
    let dir = tempdir()?;
    write_episode(&dir.path().join("episode_0.hdf5"), &episode(100, 10.0))?;
    write_episode(&dir.path().join("episode_1.hdf5"), &episode(200, 10.0))?;
    write_episode(&dir.path().join("episode_2.hdf5"), &episode(300, 10.0))?;

    let meta = MetaConfig::default();
    let summary = folder_aggregator(&meta, EmptyFolderPolicy::Fail).aggregate(dir.path())?;

    assert_eq!(summary.episode_count, 3);
    assert_eq!(summary.total_frame_count, 600);
    assert!((summary.total_time_seconds - 60.0).abs() < 1e-9);
    let episode_time: f64 = summary.episodes.iter().map(|e| e.total_time_seconds).sum();
    assert!((summary.total_time_seconds - episode_time).abs() < 1e-9);
    Ok(())
}

#[test]
fn malformed_container_is_listed_under_skipped() -> anyhow::Result<()> {
    let dir = tempdir()?;
    write_episode(&dir.path().join("a.hdf5"), &episode(40, 20.0))?;
    write_garbage(&dir.path().join("b.hdf5"))?;
    write_episode(&dir.path().join("c.hdf5"), &episode(60, 20.0))?;

    let meta = MetaConfig::default();
    let summary = folder_aggregator(&meta, EmptyFolderPolicy::Fail).aggregate(dir.path())?;

    assert_eq!(summary.episode_count, 2);
    assert_eq!(summary.total_frame_count, 100);
    assert_eq!(
        summary.skipped.iter().map(|s| s.path.clone()).collect::<Vec<_>>(),
        vec![dir.path().join("b.hdf5")]
    );
    Ok(())
}

#[test]
fn folder_of_only_malformed_containers_is_empty() -> anyhow::Result<()> {
    let dir = tempdir()?;
    write_garbage(&dir.path().join("a.hdf5"))?;

    let meta = MetaConfig::default();
    let err = folder_aggregator(&meta, EmptyFolderPolicy::Fail)
        .aggregate(dir.path())
        .err();

    assert!(matches!(err, Some(Error::EmptyFolder { skipped: 1, .. })));
    Ok(())
}

#[test]
fn config_defaults_and_segments_flow_into_the_csv() -> anyhow::Result<()> {
    let dir = tempdir()?;
    let mut raw = episode(50, 10.0);
    raw.segment_bounds = Some(vec![SegmentBound::range(0, 20), SegmentBound::range(20, 50)]);
    if let Some(attrs) = raw.attributes.as_mut() {
        attrs.remove("robot_id");
    }
    write_episode(&dir.path().join("nested/ep.hdf5"), &raw)?;
    let meta =
        MetaConfig::from_json_str(r#"{"ROBOT_ID": "from-config", "TARGET_ITEM": "sponge"}"#)?;

    let summary = folder_aggregator(&meta, EmptyFolderPolicy::Fail).aggregate(dir.path())?;
    let path = write_folder_csv(&summary, dir.path())?;

    assert_eq!(path, dir.path().join(FOLDER_CSV_FILE_NAME));
    let csv = fs::read_to_string(path)?;
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines.len(), 3);
    assert_eq!(
        lines[1],
        "nested/ep,5.0,0.001388888888888889,50,10.0,from-config,unknown,2,,unknown,unknown,sponge,,"
    );
    assert!(lines[2].starts_with("TOTAL,5.0,"));
    Ok(())
}

#[test]
fn zero_frame_episode_contributes_nothing() -> anyhow::Result<()> {
    let dir = tempdir()?;
    write_episode(&dir.path().join("empty.hdf5"), &episode(0, 10.0))?;
    write_episode(&dir.path().join("full.hdf5"), &episode(30, 10.0))?;

    let meta = MetaConfig::default();
    let summary = folder_aggregator(&meta, EmptyFolderPolicy::Fail).aggregate(dir.path())?;

    assert_eq!(summary.episode_count, 2);
    assert_eq!(summary.episodes[0].frame_count, 0);
    assert_eq!(summary.episodes[0].total_time_seconds, 0.0);
    assert_eq!(summary.episodes[0].segment_count, 0);
    assert_eq!(summary.total_time_seconds, 3.0);
    Ok(())
}
