use outrank_live::domain::game::{
    RaceTrackLayout, RankSnapshot, TRACK_HEIGHT, TRACK_WIDTH, ZoneThresholds,
};

fn snap(time_ms: f64, rank: u32, total: usize) -> RankSnapshot {
    RankSnapshot { time_ms, rank, total }
}

#[test]
fn empty_history_has_no_layout() {
    assert!(RaceTrackLayout::compute(&[], 10).is_none());
    assert!(RaceTrackLayout::compute(&[snap(0.0, 1, 10)], 0).is_none());
}

#[test]
fn ranks_map_top_to_bottom_inside_the_track() {
    let history = [snap(0.0, 1, 10), snap(60_000.0, 5, 10), snap(120_000.0, 10, 10)];
    let layout = RaceTrackLayout::compute(&history, 10).unwrap();

    assert_eq!(layout.points.len(), 3);
    assert_eq!(layout.points[0], (layout.plot_left, layout.plot_top));
    assert_eq!(layout.points[2], (layout.plot_right, layout.plot_bottom));
    assert_eq!(layout.current, layout.points[2]);
    assert!(layout.plot_right <= TRACK_WIDTH && layout.plot_bottom <= TRACK_HEIGHT);
    assert!(layout.gold_boundary_y < layout.silver_boundary_y);
}

#[test]
fn time_axis_uses_round_intervals() {
    let history = [snap(0.0, 3, 10), snap(120_000.0, 2, 10)];
    let layout = RaceTrackLayout::compute(&history, 10).unwrap();
    let texts: Vec<&str> = layout.x_labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["0:00", "0:30", "1:00", "1:30", "2:00"]);
}

#[test]
fn rank_labels_are_not_repeated() {
    let layout = RaceTrackLayout::compute(&[snap(0.0, 1, 2)], 2).unwrap();
    let texts: Vec<&str> = layout.y_labels.iter().map(|l| l.text.as_str()).collect();
    assert_eq!(texts, vec!["#1", "#2"]);
    assert!(layout.x_labels.is_empty());
}

#[test]
fn thresholds_follow_the_field_size() {
    assert_eq!(ZoneThresholds::for_total(10), ZoneThresholds { gold_end: 4, silver_end: 6 });
    assert_eq!(ZoneThresholds::for_total(1), ZoneThresholds { gold_end: 1, silver_end: 2 });
}

#[test]
fn polyline_is_svg_ready() {
    let layout = RaceTrackLayout::compute(&[snap(0.0, 1, 3), snap(1_000.0, 3, 3)], 3).unwrap();
    assert_eq!(layout.polyline().split(' ').count(), 2);
}
