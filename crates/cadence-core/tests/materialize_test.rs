//! End-to-end materialization: wire payloads through the outline into
//! a filled plan.

use cadence_backend::types::{ExtractResponse, GenerateResponse, GeneratedPost, WeekExtract};
use cadence_core::plan::{Plan, PlanSettings, ScheduleOutline, apply_generation, build_outline, materialize};
use indexmap::IndexMap;
use std::collections::HashMap;

// ===========================================================================
// Fixtures
// ===========================================================================

const EXTRACT_BODY: &str = r#"{
  "status": "success",
  "content": {
    "week_1": {
      "week": "Launch prep",
      "content_by_days": {
        "Monday": [
          {"text": "Teaser campaign\nPost the countdown teaser\nTag early adopters"}
        ],
        "Tuesday": [
          {"text": "Teaser campaign\nAnswer questions from the teaser thread"}
        ]
      }
    },
    "week_2": {
      "week": "",
      "content_by_days": {}
    }
  },
  "temp_id": "tmp-42"
}"#;

const GENERATE_BODY: &str = r#"{
  "status": "success",
  "results": {
    "instagram": [
      {
        "week_day": "Week 1 - Monday",
        "content": "Counting down: 3 days to launch.",
        "image": "https://cdn.example/teaser.png"
      }
    ]
  }
}"#;

fn settings() -> PlanSettings {
    PlanSettings {
        weeks: 2,
        days: vec!["Monday".to_string(), "Tuesday".to_string()],
        platforms: vec!["Instagram".to_string()],
        posts_per_day: 2,
    }
}

fn extraction(body: &str) -> IndexMap<String, WeekExtract> {
    match serde_json::from_str(body).expect("extraction fixture should parse") {
        ExtractResponse::Success { content, .. } => content,
        ExtractResponse::Error { message } => panic!("fixture is an error payload: {message:?}"),
    }
}

fn generation(body: &str) -> HashMap<String, Vec<GeneratedPost>> {
    match serde_json::from_str(body).expect("generation fixture should parse") {
        GenerateResponse::Success { results } => results,
        GenerateResponse::Error { message } => panic!("fixture is an error payload: {message:?}"),
    }
}

// ===========================================================================
// Tests
// ===========================================================================

#[test]
fn wire_payloads_materialize_into_the_plan() {
    let outline = build_outline(&extraction(EXTRACT_BODY));
    let results = generation(GENERATE_BODY);

    let plan = materialize(&settings(), &outline, &results);

    // Week 1 ideas come from the extraction: the first block's first
    // line overrides the week title, the remainder is the sub-topic.
    let week1 = plan.week(1).expect("week 1 should exist");
    assert_eq!(week1.main_idea, "Teaser campaign");
    assert_eq!(
        plan.day(1, "Monday").expect("monday").sub_topic,
        "Post the countdown teaser Tag early adopters"
    );
    assert_eq!(
        plan.day(1, "Tuesday").expect("tuesday").sub_topic,
        "Answer questions from the teaser thread"
    );

    // The single generated post lands in week 1 Monday slot 0.
    let filled = plan.slot(1, "Monday", "Instagram", 0).expect("slot 0");
    assert_eq!(filled.content, "Counting down: 3 days to launch.");
    assert_eq!(filled.image_url.as_deref(), Some("https://cdn.example/teaser.png"));
    assert_eq!(filled.time, "9:00");

    // The unaddressed sibling slot keeps its schedule and stays empty.
    let empty = plan.slot(1, "Monday", "Instagram", 1).expect("slot 1");
    assert_eq!(empty.time, "12:00");
    assert!(empty.content.is_empty());
    assert!(empty.image_url.is_none());

    for slot in &plan.track(1, "Tuesday", "Instagram").expect("tuesday track").slots {
        assert!(slot.content.is_empty());
    }

    // Week 2 had an empty title and no day content: placeholder main
    // idea, empty sub-topics, empty slots.
    let week2 = plan.week(2).expect("week 2 should exist");
    assert_eq!(week2.main_idea, "Main Idea for week_2");
    for day in &week2.days {
        assert!(day.sub_topic.is_empty());
        for track in &day.tracks {
            for slot in &track.slots {
                assert!(slot.content.is_empty());
                assert!(slot.image_url.is_none());
            }
        }
    }
}

#[test]
fn materialization_is_idempotent() {
    let outline = build_outline(&extraction(EXTRACT_BODY));
    let results = generation(GENERATE_BODY);

    let first = materialize(&settings(), &outline, &results);
    let second = materialize(&settings(), &outline, &results);
    assert_eq!(first, second);

    // Re-applying the same response to an already-filled plan is a
    // no-op as well.
    let mut reapplied = first.clone();
    apply_generation(&mut reapplied, &results);
    assert_eq!(reapplied, first);
}

#[test]
fn unroutable_posts_are_dropped_without_touching_geometry() {
    let body = r#"{
      "status": "success",
      "results": {
        "instagram": [
          {"week_day": "Week 1 - Monday", "content": "first"},
          {"week_day": "Monday week one", "content": "mislabeled"},
          {"week_day": "Week 1 - Monday", "content": "second"},
          {"week_day": "Week 1 - Monday", "content": "overflow"},
          {"week_day": "Week 1 - Sunday", "content": "unknown day"},
          {"week_day": "Week 9 - Monday", "content": "unknown week"}
        ],
        "tiktok": [
          {"week_day": "Week 1 - Monday", "content": "unknown platform"}
        ]
      }
    }"#;
    let results = generation(body);

    let plan = materialize(&settings(), &ScheduleOutline::default(), &results);

    // Only the two routable posts land; nothing else changes. The
    // mislabeled post between them does not consume a slot.
    let mut expected = Plan::new(&settings());
    {
        let track = expected
            .track_mut(1, "Monday", "Instagram")
            .expect("monday track");
        track.slots[0].content = "first".to_string();
        track.slots[1].content = "second".to_string();
    }
    assert_eq!(plan, expected);
}
