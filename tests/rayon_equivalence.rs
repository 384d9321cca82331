//! The rayon variants must be bit-identical to their sequential counterparts.
#![cfg(feature = "rayon")]

use detdecode::lowlevel::{
    filter_candidates, label_proposals, suppress_per_class, suppress_per_class_par,
};
use detdecode::{
    decode_batch, decode_batch_par, DecodeConfig, DeltasView, ProposalSet, RoiBox, ScoresView,
};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn random_inputs(
    rng: &mut StdRng,
    num_rois: usize,
    num_classes: usize,
) -> (Vec<f32>, Vec<f32>, Vec<RoiBox>) {
    let mut probs = Vec::with_capacity(num_rois * num_classes);
    for _ in 0..num_rois {
        let raw: Vec<f32> = (0..num_classes).map(|_| rng.random_range(0.01..1.0)).collect();
        let sum: f32 = raw.iter().sum();
        probs.extend(raw.into_iter().map(|p| p / sum));
    }
    let deltas: Vec<f32> = (0..num_rois * num_classes * 4)
        .map(|_| rng.random_range(-1.5..1.5))
        .collect();
    let rois: Vec<RoiBox> = (0..num_rois)
        .map(|_| {
            let y1 = rng.random_range(0.0..0.8);
            let x1 = rng.random_range(0.0..0.8);
            RoiBox::new(y1, x1, y1 + rng.random_range(0.05..0.2), x1 + rng.random_range(0.05..0.2))
        })
        .collect();
    (probs, deltas, rois)
}

#[test]
fn parallel_suppression_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(101);
    let (probs, _, rois) = random_inputs(&mut rng, 400, 6);
    let view = ScoresView::from_slice(&probs, 400, 6).unwrap();
    let labels = label_proposals(&view);
    let survivors = filter_candidates(&labels, Some(0.2));

    let sequential = suppress_per_class(&survivors, &labels, &rois, 0.3, 50);
    let parallel = suppress_per_class_par(&survivors, &labels, &rois, 0.3, 50);
    assert_eq!(sequential, parallel);
}

#[test]
fn parallel_batch_matches_sequential() {
    let mut rng = StdRng::seed_from_u64(202);
    let images: Vec<_> = (0..4)
        .map(|_| random_inputs(&mut rng, 150, 5))
        .collect();
    let sets: Vec<ProposalSet<'_>> = images
        .iter()
        .map(|(probs, deltas, rois)| ProposalSet {
            probs: ScoresView::from_slice(probs, 150, 5).unwrap(),
            deltas: DeltasView::from_slice(deltas, 150, 5).unwrap(),
            rois,
            image_shape: (480, 640),
        })
        .collect();
    let cfg = DecodeConfig {
        min_confidence: Some(0.25),
        ..DecodeConfig::default()
    };

    let sequential = decode_batch(&sets, &cfg).unwrap();
    let parallel = decode_batch_par(&sets, &cfg).unwrap();
    assert_eq!(sequential, parallel);
}
