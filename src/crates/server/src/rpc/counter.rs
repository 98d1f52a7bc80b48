use crate::rpc::helper::RpcInput;
use crate::rpc::response::counter::Counter;
use crate::rpc::response::error::RpcError;
use crate::AppState;
use actix_web::web::{self, Json};
use application::command::counter::{
    CounterAppService, DecrementCounterCmd, IncrementCounterCmd, ResetCounterCmd,
};
use domain::counter::CounterRepository;
use infra::repository::postgres::command::counter::CounterRepositoryImpl;
use log::info;
use serde::Deserialize;
use std::sync::Arc;

/// incrementCounter 请求参数
#[derive(Deserialize, Debug, Default)]
pub struct IncrementCounterInput {
    /// 默认 1，可为负数
    #[serde(default)]
    pub amount: Option<i64>,
}

/// decrementCounter 请求参数
#[derive(Deserialize, Debug, Default)]
pub struct DecrementCounterInput {
    /// 默认 1
    #[serde(default)]
    pub amount: Option<i64>,
}

/// resetCounter 请求参数
#[derive(Deserialize, Debug, Default)]
pub struct ResetCounterInput {
    /// 默认 0
    #[serde(default)]
    pub value: Option<i64>,
}

impl From<IncrementCounterInput> for IncrementCounterCmd {
    fn from(input: IncrementCounterInput) -> Self {
        let default = Self::default();
        Self {
            amount: input.amount.unwrap_or(default.amount),
        }
    }
}

impl From<DecrementCounterInput> for DecrementCounterCmd {
    fn from(input: DecrementCounterInput) -> Self {
        let default = Self::default();
        Self {
            amount: input.amount.unwrap_or(default.amount),
        }
    }
}

impl From<ResetCounterInput> for ResetCounterCmd {
    fn from(input: ResetCounterInput) -> Self {
        let default = Self::default();
        Self {
            value: input.value.unwrap_or(default.value),
        }
    }
}

fn counter_service(state: &AppState) -> CounterAppService {
    let counter_repo: Arc<dyn CounterRepository> =
        Arc::new(CounterRepositoryImpl::new(state.db.clone()));
    CounterAppService::new(counter_repo)
}

/// getCounter - 读取计数器，不存在时创建（初始值 0）
pub async fn get_counter(state: web::Data<AppState>) -> Result<Json<Counter>, RpcError> {
    let counter = counter_service(&state).get_counter().await?;
    Ok(Json(counter.into()))
}

/// incrementCounter - 原子加 amount
pub async fn increment_counter(
    state: web::Data<AppState>,
    input: RpcInput<IncrementCounterInput>,
) -> Result<Json<Counter>, RpcError> {
    let cmd = IncrementCounterCmd::from(input.into_inner());
    info!("incrementCounter amount={}", cmd.amount);
    let counter = counter_service(&state).increment_counter(cmd).await?;
    Ok(Json(counter.into()))
}

/// decrementCounter - 原子减 amount，允许结果为负
pub async fn decrement_counter(
    state: web::Data<AppState>,
    input: RpcInput<DecrementCounterInput>,
) -> Result<Json<Counter>, RpcError> {
    let cmd = DecrementCounterCmd::from(input.into_inner());
    info!("decrementCounter amount={}", cmd.amount);
    let counter = counter_service(&state).decrement_counter(cmd).await?;
    Ok(Json(counter.into()))
}

/// resetCounter - 设置为 value（不是偏移量）
pub async fn reset_counter(
    state: web::Data<AppState>,
    input: RpcInput<ResetCounterInput>,
) -> Result<Json<Counter>, RpcError> {
    let cmd = ResetCounterCmd::from(input.into_inner());
    info!("resetCounter value={}", cmd.value);
    let counter = counter_service(&state).reset_counter(cmd).await?;
    Ok(Json(counter.into()))
}
