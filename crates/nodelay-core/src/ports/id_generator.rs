//! IdGenerator port - ID 生成の抽象化
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::ids::{LaunchId, RoundId};
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は launch と round の ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（provider は複数ラベルのラウンドから同時に呼ばれる）
pub trait IdGenerator: Send + Sync {
    fn generate_launch_id(&self) -> LaunchId;

    fn generate_round_id(&self) -> RoundId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock の時刻を timestamp 部分に使うので、FixedClock で
/// timestamp が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    fn next_ulid(&self) -> Ulid {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        Ulid::from_parts(timestamp_ms, rand::random())
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_launch_id(&self) -> LaunchId {
        LaunchId::from(self.next_ulid())
    }

    fn generate_round_id(&self) -> RoundId {
        RoundId::from(self.next_ulid())
    }
}
