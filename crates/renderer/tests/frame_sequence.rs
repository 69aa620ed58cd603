mod support;

use renderer::{
    seed_payload, Extent, FrameOrchestrator, FrameOutcome, PassClock, Program, RenderError,
    RenderMode,
};

use support::{FakeBackend, ScriptedClock};

fn simulation(width: u32, height: u32, script: &[f64]) -> FrameOrchestrator<FakeBackend, ScriptedClock> {
    FrameOrchestrator::new(
        FakeBackend::new(width, height),
        ScriptedClock::new(script),
        RenderMode::Simulation,
    )
    .unwrap()
}

#[test]
fn simulation_accumulates_delta_time_across_frames() {
    let mut orchestrator = simulation(4, 4, &[0.0, 0.0, 0.016, 0.032]);
    assert_eq!(orchestrator.mode(), RenderMode::Simulation);
    assert_eq!(orchestrator.clock().resets, 1);

    for _ in 0..3 {
        let outcome = orchestrator.render_frame().unwrap();
        assert!(matches!(outcome, FrameOutcome::Presented { .. }));
    }
    assert_eq!(orchestrator.frames(), 3);

    let seed = seed_payload(Extent::new(4, 4));
    let state = orchestrator.targets().input().unwrap().pixels.borrow().clone();
    for (pixel, seeded) in state.iter().zip(&seed) {
        assert!((pixel[0] - (seeded[0] + 0.032)).abs() < 1e-5);
        assert_eq!(pixel[1], seeded[1]);
    }

    let first = &orchestrator.backend().draws[0];
    assert_eq!(first.program, Program::User);
    assert_eq!(first.sampled_pixels.as_ref(), Some(&seed));
    assert_eq!(first.params.clock, PassClock::Delta(0.0));
}

#[test]
fn each_frame_reads_what_the_previous_frame_wrote() {
    let mut orchestrator = simulation(2, 2, &[0.0, 0.1, 0.2, 0.3, 0.4]);
    for _ in 0..4 {
        orchestrator.render_frame().unwrap();
    }

    let backend = orchestrator.backend();
    let mut previous_output = None;
    for frame in 0..4 {
        let draws = backend.draws_in_frame(frame);
        assert_eq!(draws.len(), 2);
        let (user, display) = (draws[0], draws[1]);

        assert_eq!(user.program, Program::User);
        assert!(user.destination.is_some());
        assert_ne!(user.sampled, user.destination);
        if let Some(previous) = previous_output {
            assert_eq!(user.sampled, Some(previous));
        }

        assert_eq!(display.program, Program::Display);
        assert_eq!(display.sampled, user.destination);
        assert_eq!(display.destination, None);
        assert_eq!(display.params.clock, PassClock::None);
        assert_eq!(display.params.view_port_size, [2.0, 2.0]);

        previous_output = user.destination;
    }
}

#[test]
fn single_pass_draws_straight_to_the_surface() {
    let mut orchestrator = FrameOrchestrator::new(
        FakeBackend::new(8, 6),
        ScriptedClock::new(&[0.0, 0.5, 1.25]),
        RenderMode::SinglePass,
    )
    .unwrap();
    assert_eq!(orchestrator.mode(), RenderMode::SinglePass);
    assert!(!orchestrator.targets().is_allocated());

    orchestrator.render_frame().unwrap();
    orchestrator.render_frame().unwrap();

    let backend = orchestrator.backend();
    assert_eq!(backend.allocation_attempts, 0);
    assert_eq!(backend.draws.len(), 2);
    for draw in &backend.draws {
        assert_eq!(draw.program, Program::User);
        assert_eq!(draw.sampled, None);
        assert_eq!(draw.destination, None);
        assert_eq!(draw.params.view_port_size, [8.0, 6.0]);
    }
    assert_eq!(backend.draws[0].params.clock, PassClock::Current(0.5));
    assert_eq!(backend.draws[1].params.clock, PassClock::Current(1.25));
}

#[test]
fn skipped_frames_leave_time_and_targets_alone() {
    let mut backend = FakeBackend::new(2, 2);
    backend.skip_begin_calls.insert(1);
    let mut orchestrator = FrameOrchestrator::new(
        backend,
        ScriptedClock::new(&[0.0, 0.1, 0.3]),
        RenderMode::Simulation,
    )
    .unwrap();

    orchestrator.render_frame().unwrap();
    let input_after_first = orchestrator.targets().input_slot();
    let samples_after_first = orchestrator.clock().samples_taken();

    assert_eq!(orchestrator.render_frame().unwrap(), FrameOutcome::Skipped);
    assert_eq!(orchestrator.targets().input_slot(), input_after_first);
    assert_eq!(orchestrator.clock().samples_taken(), samples_after_first);
    assert_eq!(orchestrator.frames(), 1);

    let outcome = orchestrator.render_frame().unwrap();
    match outcome {
        FrameOutcome::Presented {
            frame_index,
            delta_seconds,
        } => {
            assert_eq!(frame_index, 1);
            assert!((delta_seconds - 0.2).abs() < 1e-6);
        }
        FrameOutcome::Skipped => panic!("third frame should be presented"),
    }
}

#[test]
fn shutdown_releases_the_target_pair() {
    let mut orchestrator = simulation(3, 3, &[0.0, 0.016]);
    orchestrator.render_frame().unwrap();
    assert_eq!(orchestrator.backend().live.len(), 2);

    let backend = orchestrator.shutdown();
    assert!(backend.live.is_empty());
}

#[test]
fn allocation_failure_aborts_start_up() {
    let mut backend = FakeBackend::new(2, 2);
    backend.fail_allocation_at = Some(0);
    let result = FrameOrchestrator::new(backend, ScriptedClock::new(&[0.0]), RenderMode::Simulation);
    assert!(matches!(result, Err(RenderError::Gpu { .. })));
}
