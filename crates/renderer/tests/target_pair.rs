mod support;

use renderer::{seed_payload, Extent, OffscreenTargetPair, RenderError, TargetSlot};

use support::FakeBackend;

#[test]
fn create_seeds_the_first_target_and_clears_the_second() {
    let mut backend = FakeBackend::new(3, 2);
    let extent = Extent::new(3, 2);
    let pair = OffscreenTargetPair::create(&mut backend, extent).unwrap();

    assert!(pair.is_allocated());
    assert_eq!(pair.extent(), extent);
    assert_eq!(pair.input_slot(), TargetSlot::First);
    assert_eq!(backend.live.len(), 2);

    let input = pair.input().unwrap();
    let output = pair.output().unwrap();
    assert_eq!(*input.pixels.borrow(), seed_payload(extent));
    assert!(output.pixels.borrow().iter().all(|pixel| *pixel == [0.0; 4]));
    assert_ne!(input.id, output.id);
}

#[test]
fn swapping_twice_restores_the_labels() {
    let mut backend = FakeBackend::new(2, 2);
    let mut pair = OffscreenTargetPair::create(&mut backend, Extent::new(2, 2)).unwrap();
    let first_input = pair.input().unwrap().id;
    let first_output = pair.output().unwrap().id;

    pair.swap();
    assert_eq!(pair.input().unwrap().id, first_output);
    assert_eq!(pair.output().unwrap().id, first_input);
    assert_eq!(pair.slot(TargetSlot::First).unwrap().id, first_input);

    pair.swap();
    assert_eq!(pair.input().unwrap().id, first_input);
    assert_eq!(pair.output().unwrap().id, first_output);
}

#[test]
fn failed_second_allocation_releases_the_first() {
    let mut backend = FakeBackend::new(4, 4);
    backend.fail_allocation_at = Some(1);

    let err = OffscreenTargetPair::create(&mut backend, Extent::new(4, 4)).unwrap_err();
    assert!(err.is_gpu_fault());
    assert_eq!(backend.allocation_attempts, 2);
    assert!(backend.live.is_empty());
}

#[test]
fn failed_validation_releases_both_targets() {
    let mut backend = FakeBackend::new(4, 4);
    backend.fail_validation_of = Some(1);

    let err = OffscreenTargetPair::create(&mut backend, Extent::new(4, 4)).unwrap_err();
    assert!(matches!(err, RenderError::TargetValidation { .. }));
    assert!(backend.live.is_empty());
}

#[test]
fn failed_validation_of_the_seeded_target_releases_both() {
    let mut backend = FakeBackend::new(4, 4);
    backend.fail_validation_of = Some(0);

    let err = OffscreenTargetPair::create(&mut backend, Extent::new(4, 4)).unwrap_err();
    match err {
        RenderError::TargetValidation { label, .. } => assert_eq!(label, "target 0"),
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(backend.allocation_attempts, 2);
    assert!(backend.live.is_empty());
}

#[test]
fn destroy_releases_once_and_tolerates_repeats() {
    let mut backend = FakeBackend::new(2, 1);
    let mut pair = OffscreenTargetPair::create(&mut backend, Extent::new(2, 1)).unwrap();
    pair.swap();

    pair.destroy(&mut backend);
    assert!(backend.live.is_empty());
    assert!(!pair.is_allocated());
    assert!(pair.input().is_none());

    // A second destroy must not release anything again.
    pair.destroy(&mut backend);

    let mut empty: OffscreenTargetPair<support::FakeTarget> = OffscreenTargetPair::empty();
    empty.destroy(&mut backend);
    assert_eq!(backend.allocation_attempts, 2);
}
