use async_trait::async_trait;
use contracts::domain::a001_tariff::aggregate::Tariff;
use contracts::domain::a002_batch::aggregate::{CreateBatchRequest, CreateBatchResponse, CreatedBatch};
use contracts::domain::a003_order::aggregate::{CategorizedOrdersResponse, RawGroupedOrders};
use contracts::domain::a004_vehicle_type::aggregate::{VehicleType, VehicleTypeListResponse};
use contracts::domain::a005_branch::aggregate::{Branch, BranchListResponse};
use contracts::shared::api_response::MessageResponse;
use serde::de::DeserializeOwned;

use super::config::ApiConfig;
use super::error::ApiError;

/// Операции REST API, которыми пользуются формы тарифов и партий
#[async_trait]
pub trait BackofficeApi: Send + Sync {
    /// GET /fleet/type
    async fn fetch_vehicle_types(&self, limit: u32) -> Result<Vec<VehicleType>, ApiError>;

    /// POST /pricing/tariff
    async fn create_tariff(&self, tariff: &Tariff) -> Result<MessageResponse, ApiError>;

    /// PATCH /pricing/tariff/{id}
    async fn update_tariff(&self, id: &str, tariff: &Tariff) -> Result<MessageResponse, ApiError>;

    /// GET /batch/categorized-orders
    async fn fetch_categorized_orders(&self, page_size: u32) -> Result<RawGroupedOrders, ApiError>;

    /// POST /batch
    async fn create_batch(&self, request: &CreateBatchRequest) -> Result<CreatedBatch, ApiError>;

    /// GET /branch
    async fn fetch_branches(&self, page_size: u32) -> Result<Vec<Branch>, ApiError>;
}

/// HTTP-клиент курьерского REST API
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    access_token: Option<String>,
}

impl ApiClient {
    pub fn new(config: &ApiConfig) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            access_token: config.access_token.clone(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorized(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let request = request.header("Accept", "application/json");
        match &self.access_token {
            Some(token) => request.header("Authorization", format!("Bearer {}", token)),
            None => request,
        }
    }

    /// Отправить запрос и вернуть тело ответа как текст.
    ///
    /// Неуспешный статус превращается в [`ApiError::Server`] с полем
    /// `message` из тела, если его удалось прочитать.
    async fn send(&self, request: reqwest::RequestBuilder) -> Result<String, ApiError> {
        let response = self.authorized(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<MessageResponse>(&body)
                .ok()
                .and_then(|m| m.message);
            tracing::error!("API request failed with status {}: {}", status, body);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        let preview: String = body.chars().take(500).collect();
        tracing::debug!("API response preview: {}", preview);
        Ok(body)
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<T, ApiError> {
        let body = self.send(request).await?;
        Ok(serde_json::from_str::<T>(&body)?)
    }

    /// Как [`Self::send_json`], но пустое тело ответа допустимо
    async fn send_message(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<MessageResponse, ApiError> {
        let body = self.send(request).await?;
        if body.trim().is_empty() {
            return Ok(MessageResponse::default());
        }
        Ok(serde_json::from_str::<MessageResponse>(&body)?)
    }
}

#[async_trait]
impl BackofficeApi for ApiClient {
    async fn fetch_vehicle_types(&self, limit: u32) -> Result<Vec<VehicleType>, ApiError> {
        let limit = limit.to_string();
        let request = self
            .client
            .get(self.url("/fleet/type"))
            .query(&[("search", ""), ("page", "1"), ("limit", limit.as_str())]);
        let response: VehicleTypeListResponse = self.send_json(request).await?;
        Ok(response.data.vehicle_types)
    }

    async fn create_tariff(&self, tariff: &Tariff) -> Result<MessageResponse, ApiError> {
        tracing::info!("POST /pricing/tariff");
        let request = self.client.post(self.url("/pricing/tariff")).json(tariff);
        self.send_message(request).await
    }

    async fn update_tariff(&self, id: &str, tariff: &Tariff) -> Result<MessageResponse, ApiError> {
        tracing::info!("PATCH /pricing/tariff/{}", id);
        let path = format!("/pricing/tariff/{}", urlencoding::encode(id));
        let request = self.client.patch(self.url(&path)).json(tariff);
        self.send_message(request).await
    }

    async fn fetch_categorized_orders(&self, page_size: u32) -> Result<RawGroupedOrders, ApiError> {
        let page_size = page_size.to_string();
        let request = self
            .client
            .get(self.url("/batch/categorized-orders"))
            .query(&[("pageSize", page_size.as_str())]);
        let response: CategorizedOrdersResponse = self.send_json(request).await?;
        Ok(response.data.grouped)
    }

    async fn create_batch(&self, request: &CreateBatchRequest) -> Result<CreatedBatch, ApiError> {
        tracing::info!("POST /batch ({} orders)", request.orders.len());
        let http = self.client.post(self.url("/batch")).json(request);
        let response: CreateBatchResponse = self.send_json(http).await?;
        Ok(response.data.batch)
    }

    async fn fetch_branches(&self, page_size: u32) -> Result<Vec<Branch>, ApiError> {
        let page_size = page_size.to_string();
        let request = self
            .client
            .get(self.url("/branch"))
            .query(&[("page", "1"), ("pageSize", page_size.as_str())]);
        let response: BranchListResponse = self.send_json(request).await?;
        Ok(response.data.branches)
    }
}

/// In-memory реализация API для тестов сессий
#[cfg(test)]
pub mod fake {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct FakeApi {
        pub vehicle_types: Vec<VehicleType>,
        pub grouped: RawGroupedOrders,
        pub branches: Vec<Branch>,
        pub batch_code: String,
        pub success_message: Option<String>,
        /// Если задано, все запросы на запись падают с этим статусом и сообщением
        pub fail_with: Option<(u16, Option<String>)>,
        pub branches_fail_with: Option<(u16, Option<String>)>,
        pub calls: Mutex<Vec<String>>,
        pub last_tariff: Mutex<Option<Tariff>>,
        pub last_batch: Mutex<Option<CreateBatchRequest>>,
    }

    impl FakeApi {
        pub fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }

        fn failure(&self) -> Option<ApiError> {
            self.fail_with.as_ref().map(|(status, message)| ApiError::Server {
                status: *status,
                message: message.clone(),
            })
        }
    }

    #[async_trait]
    impl BackofficeApi for FakeApi {
        async fn fetch_vehicle_types(&self, limit: u32) -> Result<Vec<VehicleType>, ApiError> {
            self.record(format!("GET /fleet/type?limit={}", limit));
            Ok(self.vehicle_types.clone())
        }

        async fn create_tariff(&self, tariff: &Tariff) -> Result<MessageResponse, ApiError> {
            self.record("POST /pricing/tariff".to_string());
            *self.last_tariff.lock().unwrap() = Some(tariff.clone());
            match self.failure() {
                Some(err) => Err(err),
                None => Ok(MessageResponse {
                    message: self.success_message.clone(),
                }),
            }
        }

        async fn update_tariff(&self, id: &str, tariff: &Tariff) -> Result<MessageResponse, ApiError> {
            self.record(format!("PATCH /pricing/tariff/{}", id));
            *self.last_tariff.lock().unwrap() = Some(tariff.clone());
            match self.failure() {
                Some(err) => Err(err),
                None => Ok(MessageResponse {
                    message: self.success_message.clone(),
                }),
            }
        }

        async fn fetch_categorized_orders(&self, page_size: u32) -> Result<RawGroupedOrders, ApiError> {
            self.record(format!("GET /batch/categorized-orders?pageSize={}", page_size));
            Ok(self.grouped.clone())
        }

        async fn create_batch(&self, request: &CreateBatchRequest) -> Result<CreatedBatch, ApiError> {
            self.record("POST /batch".to_string());
            *self.last_batch.lock().unwrap() = Some(request.clone());
            match self.failure() {
                Some(err) => Err(err),
                None => Ok(CreatedBatch {
                    id: None,
                    batch_code: self.batch_code.clone(),
                }),
            }
        }

        async fn fetch_branches(&self, page_size: u32) -> Result<Vec<Branch>, ApiError> {
            self.record(format!("GET /branch?pageSize={}", page_size));
            match &self.branches_fail_with {
                Some((status, message)) => Err(ApiError::Server {
                    status: *status,
                    message: message.clone(),
                }),
                None => Ok(self.branches.clone()),
            }
        }
    }
}
