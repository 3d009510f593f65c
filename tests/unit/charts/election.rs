use super::*;
use crate::frames::source::FrameSource;

fn candidate(name: &str, votes: u64, color: Option<Rgb8>) -> Candidate {
    Candidate {
        name: name.to_string(),
        party_name: format!("{name} Party"),
        votes,
        vote_share: 0.0,
        vote_share_change: None,
        color,
    }
}

fn three_way() -> ElectionInput {
    ElectionInput {
        candidates: vec![
            candidate("A", 50, Some(Rgb8::new(255, 0, 0))),
            candidate("B", 30, Some(Rgb8::new(0, 0, 255))),
            candidate("C", 20, None),
        ],
        electorate: 200,
        turnout: 100,
        ..ElectionInput::default()
    }
}

#[test]
fn slices_follow_votes_clockwise_from_the_top() {
    let slices = pie_slices(&three_way()).unwrap();
    assert_eq!(slices.len(), 3);
    assert!((slices[0].fraction - 0.5).abs() < 1e-12);
    assert!((slices[0].start_angle + PI / 2.0).abs() < 1e-12);
    assert!((slices[1].start_angle - PI / 2.0).abs() < 1e-12);

    let swept: f64 = slices.iter().map(|s| s.sweep).sum();
    assert!((swept - 2.0 * PI).abs() < 1e-9);
    assert_eq!(slices[2].color, PALETTE[2]);
}

#[test]
fn non_voters_get_their_own_slice() {
    let input = ElectionInput {
        include_non_voters: true,
        ..three_way()
    };
    let slices = pie_slices(&input).unwrap();
    assert_eq!(slices.len(), 4);
    assert_eq!(slices[3].label, NON_VOTER_LABEL);
    assert_eq!(slices[3].votes, 100);
    assert!((slices[3].fraction - 0.5).abs() < 1e-12);
}

#[test]
fn turnout_above_electorate_is_rejected_only_with_non_voters() {
    let bad = ElectionInput {
        electorate: 50,
        turnout: 100,
        include_non_voters: true,
        ..three_way()
    };
    assert!(pie_slices(&bad).unwrap_err().is_client_error());

    let ok = ElectionInput {
        include_non_voters: false,
        ..bad
    };
    assert!(pie_slices(&ok).is_ok());
}

#[test]
fn empty_or_voteless_elections_are_invalid() {
    let empty = ElectionInput::default();
    assert!(matches!(
        empty.validate().unwrap_err(),
        MagikdError::InvalidInput(_)
    ));

    let voteless = ElectionInput {
        candidates: vec![candidate("A", 0, None)],
        ..ElectionInput::default()
    };
    assert!(voteless.validate().is_err());
}

#[test]
fn from_json_validates() {
    let json = br#"{
        "candidates": [
            {"name": "A", "party_name": "P", "votes": 10, "vote_share": 62.5, "vote_share_change": 1.5},
            {"name": "B", "party_name": "Q", "votes": 6, "vote_share": 37.5, "vote_share_change": -2.0}
        ],
        "electorate": 40,
        "turnout": 16,
        "include_non_voters": true,
        "table": true
    }"#;
    let input = ElectionInput::from_json(json).unwrap();
    assert!(input.table);
    assert_eq!(input.non_voters(), 24);

    assert!(ElectionInput::from_json(br#"{"candidates": []}"#).is_err());
    assert!(ElectionInput::from_json(br#"{"candidates": [{"name": "A", "votes": -1}]}"#).is_err());
}

#[test]
fn group_thousands_inserts_separators() {
    assert_eq!(group_thousands(0), "0");
    assert_eq!(group_thousands(999), "999");
    assert_eq!(group_thousands(1000), "1,000");
    assert_eq!(group_thousands(1_234_567), "1,234,567");
}

#[test]
fn table_lists_every_candidate() {
    let mut input = three_way();
    input.table = true;
    input.candidates[0].name = "Smith & Sons".into();
    input.candidates[0].vote_share_change = Some(1.5);
    input.candidates[1].vote_share_change = Some(-2.0);

    let svg = table_svg(&input).unwrap();
    assert!(svg.contains("Smith &amp; Sons"));
    assert!(svg.contains("+1.5"));
    assert!(svg.contains("-2.0"));
    assert!(svg.contains("Turnout: 100 (50.0%)"));
}

#[test]
fn pie_renders_slice_colors() {
    let out = render_election(&three_way(), &SvgRasterizer::without_fonts()).unwrap();
    let decoded = FrameSource::decode(&out.bytes).unwrap();
    let img = decoded.frames()[0].image();

    assert_eq!(img.get_pixel(360, 300).0, [255, 0, 0, 255]);
    assert_eq!(img.get_pixel(160, 300).0, [0, 0, 255, 255]);
    assert_eq!(img.get_pixel(5, 5).0, [255, 255, 255, 255]);
}
