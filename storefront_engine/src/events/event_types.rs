use serde::{Deserialize, Serialize};

use crate::db_types::{Order, OrderStatus};

/// Emitted once for every order successfully placed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderCreatedEvent {
    pub order: Order,
}

impl OrderCreatedEvent {
    pub fn new(order: Order) -> Self {
        Self { order }
    }
}

/// Emitted once for every successful status transition. `order` carries the new status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrderStatusChangedEvent {
    pub old_status: OrderStatus,
    pub order: Order,
}

impl OrderStatusChangedEvent {
    pub fn new(old_status: OrderStatus, order: Order) -> Self {
        Self { old_status, order }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum OrderLifecycleEvent {
    Created(OrderCreatedEvent),
    StatusChanged(OrderStatusChangedEvent),
}

impl OrderLifecycleEvent {
    pub fn order(&self) -> &Order {
        match self {
            OrderLifecycleEvent::Created(ev) => &ev.order,
            OrderLifecycleEvent::StatusChanged(ev) => &ev.order,
        }
    }
}
