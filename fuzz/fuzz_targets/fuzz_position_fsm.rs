#![no_main]
use libfuzzer_sys::fuzz_target;
use player_core::{LimitReading, PositionState};

fuzz_target!(|readings: Vec<(bool, bool)>| {
    let mut state = PositionState::Offmark;
    for (top, bottom) in readings {
        let next = state.next(LimitReading { top, bottom });
        assert!(state.can_step_to(next), "{state} -> {next}");
        if state == PositionState::Finished {
            assert_eq!(next, PositionState::Finished);
        }
        state = next;
    }
});
