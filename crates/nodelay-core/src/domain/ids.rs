//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID + ジェネリック実装
//! Pending launch と provisioning round は ULID で識別します。
//! `Id<T>` の `T` は PhantomData のマーカー型で、LaunchId と RoundId を
//! コンパイル時に区別します。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: launch の要求順に並ぶ
//! - **分散生成可能**: provider ごとに調整なしで生成できる

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"launch-", "round-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Launch のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Launch {}

impl IdMarker for Launch {
    fn prefix() -> &'static str {
        "launch-"
    }
}

/// Round のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Round {}

impl IdMarker for Round {
    fn prefix() -> &'static str {
        "round-"
    }
}

/// Identifier of a pending launch (one unit of capacity underway).
pub type LaunchId = Id<Launch>;

/// Identifier of one provisioning round for one label.
pub type RoundId = Id<Round>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_their_prefix() {
        let ulid = Ulid::new();
        let launch = LaunchId::from_ulid(ulid);
        let round = RoundId::from_ulid(ulid);

        assert_eq!(launch.as_ulid(), round.as_ulid());
        assert_eq!(launch.to_string(), format!("launch-{ulid}"));
        assert_eq!(round.to_string(), format!("round-{ulid}"));
        // let _: LaunchId = round; // <- does not compile
    }

    #[test]
    fn launch_ids_sort_by_creation_time() {
        let id1 = LaunchId::from_ulid(Ulid::from_parts(1_000, 7));
        let id2 = LaunchId::from_ulid(Ulid::from_parts(2_000, 3));
        assert!(id1 < id2);
    }

    #[test]
    fn launch_ids_can_be_serialized() {
        let id = LaunchId::from_ulid(Ulid::new());
        let serialized = serde_json::to_string(&id).unwrap();
        let deserialized: LaunchId = serde_json::from_str(&serialized).unwrap();
        assert_eq!(id, deserialized);
    }
}
