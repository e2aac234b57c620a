use crate::Vehicle;
use serde_json::json;

thread_local!(
    static DEBUG_FRAME: std::cell::RefCell<Vec<serde_json::Value>> = Default::default();
);

/// Records the state of a vehicle at the end of the current frame.
pub fn debug_vehicle(vehicle: &Vehicle) {
    DEBUG_FRAME.with(|frame| {
        frame.borrow_mut().push(json!({
            "type": "vehicle",
            "seq": vehicle.seq(),
            "angle": vehicle.angle(),
            "speed": vehicle.speed(),
            "state": vehicle.state(),
            "forced_stop": vehicle.is_forced_stopped(),
        }))
    })
}

pub fn take_debug_frame() -> serde_json::Value {
    json!(DEBUG_FRAME.with(|frame| frame.take()))
}
