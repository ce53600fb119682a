use std::collections::HashMap;

use anyhow::Result;
use nawba::config::PipelineConfig;
use nawba::ml::{average_by_category, zip_to_frame};
use nawba::pipeline::NawbaPipeline;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

fn recordings() -> Vec<(&'static str, &'static str)> {
    vec![
        ("d1", "r5 r5 s2 t1"),
        ("d1", "s2 s2 t1"),
        ("d2", "r5 q7 q7 q7"),
        ("d2", "q7 t1 s2"),
        ("d3", "t1 t1 r5 x9"),
        ("d1", "x9 r5"),
    ]
}

#[test]
fn aggregation_ignores_recording_order() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let pairs = recordings();
    let (ids, texts): (Vec<_>, Vec<_>) = pairs.iter().copied().unzip();
    let expected = pipeline.aggregate(&pipeline.distributions(&texts)?, &ids)?;

    let mut rng = StdRng::seed_from_u64(17);
    for _ in 0..5 {
        let mut shuffled = pairs.clone();
        shuffled.shuffle(&mut rng);
        let (ids, texts): (Vec<_>, Vec<_>) = shuffled.into_iter().unzip();
        let aggregated = pipeline.aggregate(&pipeline.distributions(&texts)?, &ids)?;
        assert_eq!(aggregated, expected);
    }
    Ok(())
}

#[test]
fn counts_add_up_across_an_index() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let distributions = pipeline.distributions(&["p q", "p r", "p s"])?;
    let aggregated = pipeline.aggregate(&distributions, &[1, 1, 1])?;

    let p = aggregated.get(&1, "p").expect("p is aggregated");
    assert_eq!(p.count, 3);
    let mean = distributions
        .iter()
        .map(|d| d.get("p").map_or(0.0, |w| w.score))
        .sum::<f64>()
        / 3.0;
    assert!((p.score - mean).abs() < 1e-12);
    Ok(())
}

#[test]
fn counts_sum_over_two_categories() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let distributions = pipeline.distributions(&["x y", "x x", "y z"])?;
    let aggregated = pipeline.aggregate(&distributions, &["A", "A", "B"])?;

    assert_eq!(aggregated.get(&"A", "x").map(|row| row.count), Some(3));
    assert_eq!(aggregated.get(&"B", "x").map(|row| row.count), Some(0));
    assert_eq!(aggregated.get(&"B", "z").map(|row| row.count), Some(1));
    Ok(())
}

#[test]
fn reaggregating_is_a_no_op() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let (ids, texts): (Vec<_>, Vec<_>) = recordings().into_iter().unzip();
    let aggregated = pipeline.aggregate(&pipeline.distributions(&texts)?, &ids)?;

    let again = average_by_category(&aggregated.to_long());
    assert_eq!(again, aggregated);
    Ok(())
}

#[test]
fn long_frame_has_one_row_per_recording_and_pattern() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let (ids, texts): (Vec<_>, Vec<_>) = recordings().into_iter().unzip();
    let vectorized = pipeline.vectorize(&texts)?;
    let distributions = pipeline.distributions(&texts)?;

    let long = zip_to_frame(&distributions, &ids)?;
    assert_eq!(long.len(), texts.len() * vectorized.vocabulary.len());

    let aggregated = average_by_category(&long);
    let distinct_ids = aggregated.indices().count();
    assert_eq!(distinct_ids, 3);
    assert_eq!(aggregated.len(), distinct_ids * vectorized.vocabulary.len());
    Ok(())
}

#[test]
fn category_frame_flags_defining_patterns() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let (categories, texts): (Vec<_>, Vec<_>) = recordings().into_iter().unzip();
    let distributions = pipeline.distributions(&texts)?;
    let defining = HashMap::from([
        ("d1", vec!["r5 s2".to_string()]),
        ("d2", vec!["q7".to_string()]),
        ("d3", vec!["x9".to_string()]),
    ]);

    let frame = pipeline.category_frame(&distributions, &"d1", &categories, &defining)?;

    // "d1" tags recordings 0, 1 and 5; the last of them is reported.
    let vocabulary = pipeline.vectorize(&texts)?.vocabulary;
    assert_eq!(frame.len(), vocabulary.len());
    for (row, weight) in frame.iter().zip(&distributions[5]) {
        assert_eq!(row.pattern, weight.pattern);
        assert_eq!(row.score, weight.score);
        assert_eq!(row.is_defining, row.pattern == "r5" || row.pattern == "s2");
    }

    let every = pipeline.category_recordings_frame(&distributions, &"d1", &categories, &defining)?;
    assert_eq!(every.len(), 3 * vocabulary.len());
    for row in &every {
        assert!([0, 1, 5].contains(&row.recording));
    }

    let err = pipeline
        .category_frame(&distributions, &"d4", &categories, &defining)
        .unwrap_err();
    assert!(err.to_string().starts_with("Unmapped key"));
    Ok(())
}

#[test]
fn top_patterns_are_sorted_by_score() -> Result<()> {
    let pipeline = NawbaPipeline::new(PipelineConfig::default())?;
    let distributions = pipeline.distributions(&["a a a b c", "b c d"])?;

    let top = distributions[0].top_n(2);
    assert_eq!(top.len(), 2);
    assert_eq!(top[0].pattern, "a");
    assert!(top[0].score >= top[1].score);
    assert_eq!(distributions[0].top_n(0).len(), distributions[0].len());
    Ok(())
}
