use uuid::Uuid;

use syncsketch_shared::StrokeId;

pub fn make_id() -> StrokeId {
    StrokeId::new(Uuid::new_v4().to_string())
}
