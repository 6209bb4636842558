//! Event Bus - 모듈 이벤트 브로드캐스트
//!
//! 리스너에게는 발행한 스레드에서 동기적으로 전달한다. 리스너 목록은
//! 스냅샷을 떠서 락 밖에서 호출하므로, 리스너가 버스에 다시 접근해도
//! 교착되지 않는다.

use super::types::ModuleEvent;
use crate::core::ModuleListener;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, trace};

// ============================================================================
// ListenerId
// ============================================================================

/// 이벤트 리스너 ID
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    fn new(id: u64) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

// ============================================================================
// EventBus
// ============================================================================

/// 이벤트 버스 설정
#[derive(Debug, Clone)]
pub struct EventBusConfig {
    /// 브로드캐스트 채널 용량
    pub channel_capacity: usize,

    /// 이벤트 히스토리 보관 개수
    pub history_size: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 1024,
            history_size: 100,
        }
    }
}

/// 모듈 이벤트 버스
///
/// 등록 순서대로 리스너를 호출한다.
pub struct EventBus {
    config: EventBusConfig,

    /// 브로드캐스트 채널 송신자 (관찰용)
    sender: broadcast::Sender<ModuleEvent>,

    /// 등록된 리스너 (ID 순 = 등록 순)
    listeners: RwLock<BTreeMap<ListenerId, Arc<dyn ModuleListener>>>,

    listener_counter: AtomicU64,

    history: Mutex<VecDeque<ModuleEvent>>,

    /// 발행된 이벤트 수
    event_count: AtomicU64,
}

impl EventBus {
    /// 기본 설정으로 이벤트 버스 생성
    pub fn new() -> Self {
        Self::with_config(EventBusConfig::default())
    }

    /// 커스텀 설정으로 이벤트 버스 생성
    pub fn with_config(config: EventBusConfig) -> Self {
        let (sender, _) = broadcast::channel(config.channel_capacity.max(1));

        Self {
            config,
            sender,
            listeners: RwLock::new(BTreeMap::new()),
            listener_counter: AtomicU64::new(0),
            history: Mutex::new(VecDeque::new()),
            event_count: AtomicU64::new(0),
        }
    }

    /// 리스너 등록
    pub fn subscribe(&self, listener: Arc<dyn ModuleListener>) -> ListenerId {
        let id = ListenerId::new(self.listener_counter.fetch_add(1, Ordering::SeqCst));

        debug!(
            listener_name = listener.name(),
            listener_id = %id,
            "Registering module listener"
        );

        self.listeners.write().insert(id, listener);
        id
    }

    /// 리스너 해제
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let removed = self.listeners.write().remove(&id).is_some();

        if removed {
            debug!(listener_id = %id, "Unregistered module listener");
        }

        removed
    }

    /// 이벤트 발행
    ///
    /// 모든 리스너가 처리를 마친 뒤 반환한다.
    pub fn publish(&self, event: ModuleEvent) {
        let seq = self.event_count.fetch_add(1, Ordering::SeqCst) + 1;

        trace!(
            event_id = %event.id,
            kind = %event.kind,
            module = %event.module_id(),
            "Publishing event #{}", seq
        );

        {
            let mut history = self.history.lock();
            history.push_back(event.clone());
            while history.len() > self.config.history_size {
                history.pop_front();
            }
        }

        // 수신자가 없으면 에러지만 무시
        let _ = self.sender.send(event.clone());

        let snapshot: Vec<(ListenerId, Arc<dyn ModuleListener>)> = self
            .listeners
            .read()
            .iter()
            .map(|(id, l)| (*id, l.clone()))
            .collect();

        for (id, listener) in snapshot {
            trace!(
                listener_id = %id,
                listener_name = listener.name(),
                kind = %event.kind,
                "Delivering event to listener"
            );
            listener.module_changed(&event);
        }
    }

    /// 브로드캐스트 수신자 생성
    pub fn receiver(&self) -> broadcast::Receiver<ModuleEvent> {
        self.sender.subscribe()
    }

    /// 최근 이벤트 히스토리 (최신순)
    pub fn history(&self, limit: Option<usize>) -> Vec<ModuleEvent> {
        let history = self.history.lock();
        let limit = limit.unwrap_or(history.len());
        history.iter().rev().take(limit).cloned().collect()
    }

    /// 등록된 리스너 수
    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// 총 발행된 이벤트 수
    pub fn event_count(&self) -> u64 {
        self.event_count.load(Ordering::SeqCst)
    }

    pub fn clear_history(&self) {
        self.history.lock().clear();
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// 테스트
// ============================================================================
