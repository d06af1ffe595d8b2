#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap},
    str::FromStr,
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, NaiveDateTime};
use order_workflow::{
    clients::{DirectoryError, UserDirectory},
    models::{NewOrder, NewOrderItem, Order, OrderItem, OrderStatus, UserSnapshot},
    repository::{OrderStore, StoreError, StoreResult},
    routes::params::page_offset,
    services::order_service::{OrderWorkflow, TransitionPolicy},
};
use reqwest::StatusCode;
use rust_decimal::Decimal;

pub fn item(name: &str, quantity: i32, price: &str) -> NewOrderItem {
    NewOrderItem {
        product_name: name.into(),
        quantity,
        price: Decimal::from_str(price).expect("valid decimal"),
    }
}

pub fn dec(value: &str) -> Decimal {
    Decimal::from_str(value).expect("valid decimal")
}

pub fn user(id: i32, name: &str) -> UserSnapshot {
    UserSnapshot {
        id,
        name: name.into(),
        email: format!("{}@example.com", name.to_lowercase()),
        phone: String::new(),
        address: String::new(),
    }
}

/// In-process order store. Creates are all-or-nothing, timestamps come from a
/// logical clock that advances one second per write.
#[derive(Default)]
pub struct MemoryOrderStore {
    inner: Mutex<Inner>,
    fail_creates: AtomicBool,
    /// Status written by a simulated concurrent writer right before the next
    /// compare-and-set.
    interfere: Mutex<Option<OrderStatus>>,
}

#[derive(Default)]
struct Inner {
    clock: i64,
    next_order_id: i32,
    next_item_id: i32,
    orders: BTreeMap<i32, Order>,
}

impl Inner {
    fn tick(&mut self) -> NaiveDateTime {
        self.clock += 1;
        NaiveDate::from_ymd_opt(2024, 1, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .expect("valid epoch")
            + Duration::seconds(self.clock)
    }
}

impl MemoryOrderStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn fail_creates(&self, fail: bool) {
        self.fail_creates.store(fail, Ordering::SeqCst);
    }

    pub fn interfere_before_next_cas(&self, status: OrderStatus) {
        *self.interfere.lock().unwrap() = Some(status);
    }

    pub fn order_count(&self) -> usize {
        self.inner.lock().unwrap().orders.len()
    }

    pub fn item_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap()
            .orders
            .values()
            .map(|order| order.items.len())
            .sum()
    }
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn create(&self, new_order: NewOrder) -> StoreResult<Order> {
        if self.fail_creates.load(Ordering::SeqCst) {
            return Err(StoreError::Db {
                op: "insert order item",
                source: sea_orm::DbErr::Custom("injected failure".into()),
            });
        }

        let mut inner = self.inner.lock().unwrap();
        let now = inner.tick();
        inner.next_order_id += 1;
        let order_id = inner.next_order_id;

        let mut items = Vec::with_capacity(new_order.items.len());
        for item in new_order.items {
            inner.next_item_id += 1;
            items.push(OrderItem {
                id: inner.next_item_id,
                order_id,
                product_name: item.product_name,
                quantity: item.quantity,
                price: item.price,
                created_at: now,
            });
        }

        let order = Order {
            id: order_id,
            user_id: new_order.user_id,
            user_name: new_order.user_name,
            user_email: new_order.user_email,
            items,
            total_amount: new_order.total_amount,
            status: new_order.status,
            created_at: now,
            updated_at: now,
        };
        inner.orders.insert(order_id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: i32) -> StoreResult<Order> {
        self.inner
            .lock()
            .unwrap()
            .orders
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, order: &Order) -> StoreResult<Order> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.tick();
        let stored = inner.orders.get_mut(&order.id).ok_or(StoreError::NotFound)?;
        stored.user_name = order.user_name.clone();
        stored.user_email = order.user_email.clone();
        stored.total_amount = order.total_amount;
        stored.status = order.status;
        stored.updated_at = now;
        Ok(stored.clone())
    }

    async fn update_status(&self, id: i32, status: OrderStatus) -> StoreResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let now = inner.tick();
        let stored = inner.orders.get_mut(&id).ok_or(StoreError::NotFound)?;
        stored.status = status;
        stored.updated_at = now;
        Ok(())
    }

    async fn compare_and_set_status(
        &self,
        id: i32,
        expected: OrderStatus,
        next: OrderStatus,
    ) -> StoreResult<bool> {
        let interference = self.interfere.lock().unwrap().take();
        let mut inner = self.inner.lock().unwrap();
        let now = inner.tick();
        let Some(stored) = inner.orders.get_mut(&id) else {
            return Ok(false);
        };
        if let Some(status) = interference {
            stored.status = status;
        }
        if stored.status != expected {
            return Ok(false);
        }
        stored.status = next;
        stored.updated_at = now;
        Ok(true)
    }

    async fn list(&self, page: u64, limit: u64) -> StoreResult<(Vec<Order>, u64)> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<Order> = inner.orders.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        let total = orders.len() as u64;
        let Some(offset) = page_offset(page, limit) else {
            return Ok((Vec::new(), total));
        };
        let page = orders
            .into_iter()
            .skip(usize::try_from(offset).unwrap_or(usize::MAX))
            .take(usize::try_from(limit).unwrap_or(usize::MAX))
            .collect();
        Ok((page, total))
    }

    async fn get_by_user_id(&self, user_id: i32) -> StoreResult<Vec<Order>> {
        let inner = self.inner.lock().unwrap();
        let mut orders: Vec<Order> = inner
            .orders
            .values()
            .filter(|order| order.user_id == user_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        Ok(orders)
    }
}

/// Directory double that answers from a map and can be switched to failing.
#[derive(Default)]
pub struct StubDirectory {
    users: Mutex<HashMap<i32, UserSnapshot>>,
    failing: AtomicBool,
    calls: AtomicUsize,
}

impl StubDirectory {
    pub fn with_users(users: impl IntoIterator<Item = UserSnapshot>) -> Arc<Self> {
        let directory = Self::default();
        {
            let mut map = directory.users.lock().unwrap();
            for user in users {
                map.insert(user.id, user);
            }
        }
        Arc::new(directory)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn rename(&self, id: i32, name: &str) {
        if let Some(user) = self.users.lock().unwrap().get_mut(&id) {
            user.name = name.into();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn lookup(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::Status(StatusCode::BAD_GATEWAY));
        }
        Ok(self.users.lock().unwrap().get(&user_id).cloned())
    }
}

#[async_trait]
impl UserDirectory for StubDirectory {
    async fn validate_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError> {
        self.lookup(user_id)
    }

    async fn get_user(&self, user_id: i32) -> Result<Option<UserSnapshot>, DirectoryError> {
        self.lookup(user_id)
    }
}

pub struct Harness {
    pub store: Arc<MemoryOrderStore>,
    pub directory: Arc<StubDirectory>,
    pub workflow: OrderWorkflow,
}

/// Workflow over in-memory collaborators; user 7 ("Ada") exists.
pub fn harness(policy: TransitionPolicy) -> Harness {
    let store = MemoryOrderStore::new();
    let directory = StubDirectory::with_users([user(7, "Ada"), user(8, "Grace")]);
    let workflow =
        OrderWorkflow::new(store.clone(), directory.clone()).with_policy(policy);
    Harness {
        store,
        directory,
        workflow,
    }
}
