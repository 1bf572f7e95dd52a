use async_trait::async_trait;
use reqwest::{
    Method,
    header::{CONTENT_TYPE, HeaderValue},
};
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, warn};
use url::form_urlencoded;

pub use crate::{
    config::ClientConfig,
    context::CallContext,
    error::{CallError, ConfigError},
    models::{
        ApiResponse, CaptureInfo, CaptureRequest, ConfirmInfo, ConfirmRequest, DetailsRequest, Empty, PaymentDetails,
        PaymentsInfo, PaymentsRequest, RefundInfo, RefundRequest, TransactionId,
    },
};
use crate::{
    signer::Signer,
    transport::{HttpRequest, HttpResponse, HttpTransport, ReqwestTransport},
};

/// An interface to interact with the LINE Pay API.
///
/// Every call returns the decoded response even when its return code signals a failure;
/// use [`ApiResponse::is_success`] or [`ApiResponse::into_result`] to check it.
#[async_trait]
pub trait LinePayClient {
    /// Start a payment, returning the URLs the user opens to approve it.
    async fn payments_request(
        &self,
        ctx: &CallContext,
        request: &PaymentsRequest,
    ) -> Result<ApiResponse<PaymentsInfo>, CallError>;

    /// Confirm a payment the user approved.
    async fn payments_confirm(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &ConfirmRequest,
    ) -> Result<ApiResponse<ConfirmInfo>, CallError>;

    /// Capture a payment that was requested with capture disabled.
    async fn payments_capture(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &CaptureRequest,
    ) -> Result<ApiResponse<CaptureInfo>, CallError>;

    /// Void an authorized payment that was not captured.
    async fn payments_void(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
    ) -> Result<ApiResponse<Empty>, CallError>;

    /// Refund a captured payment, fully or partially.
    async fn payments_refund(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &RefundRequest,
    ) -> Result<ApiResponse<RefundInfo>, CallError>;

    /// Look up payments by transaction and/or order id.
    async fn payments_details(
        &self,
        ctx: &CallContext,
        request: &DetailsRequest,
    ) -> Result<ApiResponse<Vec<PaymentDetails>>, CallError>;

    /// Check the state of a requested payment; the answer is carried in the return code.
    async fn payment_status(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
    ) -> Result<ApiResponse<Empty>, CallError>;
}

/// The default LINE Pay client that hits the actual service.
#[derive(Clone, Debug)]
pub struct DefaultLinePayClient<T = ReqwestTransport> {
    transport: T,
    signer: Signer,
    base_url: String,
}

impl DefaultLinePayClient {
    pub fn new(config: ClientConfig) -> Result<Self, ConfigError> {
        let transport = ReqwestTransport::new()?;
        Self::with_transport(config, transport)
    }
}

impl<T: HttpTransport> DefaultLinePayClient<T> {
    /// Build a client that sends its requests through `transport`.
    pub fn with_transport(config: ClientConfig, transport: T) -> Result<Self, ConfigError> {
        let base_url = config.base_url()?;
        let signer = Signer::new(config.channel_id, config.channel_secret)?;
        debug!("Created LINE Pay client");
        Ok(Self { transport, signer, base_url })
    }

    pub fn signer(&self) -> &Signer {
        &self.signer
    }

    fn make_url(&self, path: &str) -> String {
        let base_url = &self.base_url;
        format!("{base_url}{path}")
    }

    async fn post<R, O>(&self, ctx: &CallContext, path: &str, request: &R) -> Result<ApiResponse<O>, CallError>
    where
        R: Serialize + Sync,
        O: DeserializeOwned,
    {
        let body = serde_json::to_string(request).map_err(CallError::Serialize)?;
        self.send(ctx, Method::POST, path, "", Some(body)).await
    }

    async fn get<O>(&self, ctx: &CallContext, path: &str, query: &str) -> Result<ApiResponse<O>, CallError>
    where
        O: DeserializeOwned,
    {
        self.send(ctx, Method::GET, path, query, None).await
    }

    async fn send<O>(
        &self,
        ctx: &CallContext,
        method: Method,
        path: &str,
        query: &str,
        body: Option<String>,
    ) -> Result<ApiResponse<O>, CallError>
    where
        O: DeserializeOwned,
    {
        // GET requests sign their query string in place of the body.
        let payload = body.as_deref().unwrap_or(query);
        let auth = self.signer.sign_fresh(path, payload);

        let mut headers = auth.to_header_map()?;
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        let url = match query {
            "" => self.make_url(path),
            query => format!("{}?{query}", self.make_url(path)),
        };

        debug!("Sending {method} {path}");
        let request = HttpRequest { method, url, headers, body };
        let response = ctx.run(self.transport.send(request)).await?;
        Self::parse_response(path, response)
    }

    fn parse_response<O>(path: &str, response: HttpResponse) -> Result<ApiResponse<O>, CallError>
    where
        O: DeserializeOwned,
    {
        let HttpResponse { status, body } = response;
        match serde_json::from_slice::<ApiResponse<O>>(&body) {
            Ok(response) => {
                if !response.is_success() {
                    debug!(
                        "LINE Pay returned code {} for {path}: {}",
                        response.return_code, response.return_message
                    );
                }
                Ok(response)
            }
            Err(source) if status.is_success() => {
                warn!("Could not decode response for {path}: {source}");
                Err(CallError::Decode { status, source })
            }
            Err(_) => Err(CallError::Status { status, body: String::from_utf8_lossy(&body).into_owned() }),
        }
    }
}

#[async_trait]
impl<T: HttpTransport> LinePayClient for DefaultLinePayClient<T> {
    async fn payments_request(
        &self,
        ctx: &CallContext,
        request: &PaymentsRequest,
    ) -> Result<ApiResponse<PaymentsInfo>, CallError> {
        self.post(ctx, "/v3/payments/request", request).await
    }

    async fn payments_confirm(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &ConfirmRequest,
    ) -> Result<ApiResponse<ConfirmInfo>, CallError> {
        let path = format!("/v3/payments/{transaction_id}/confirm");
        self.post(ctx, &path, request).await
    }

    async fn payments_capture(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &CaptureRequest,
    ) -> Result<ApiResponse<CaptureInfo>, CallError> {
        let path = format!("/v3/payments/authorizations/{transaction_id}/capture");
        self.post(ctx, &path, request).await
    }

    async fn payments_void(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
    ) -> Result<ApiResponse<Empty>, CallError> {
        let path = format!("/v3/payments/authorizations/{transaction_id}/void");
        self.post(ctx, &path, &Empty {}).await
    }

    async fn payments_refund(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
        request: &RefundRequest,
    ) -> Result<ApiResponse<RefundInfo>, CallError> {
        let path = format!("/v3/payments/{transaction_id}/refund");
        self.post(ctx, &path, request).await
    }

    async fn payments_details(
        &self,
        ctx: &CallContext,
        request: &DetailsRequest,
    ) -> Result<ApiResponse<Vec<PaymentDetails>>, CallError> {
        let query = details_query(request);
        self.get(ctx, "/v3/payments", &query).await
    }

    async fn payment_status(
        &self,
        ctx: &CallContext,
        transaction_id: TransactionId,
    ) -> Result<ApiResponse<Empty>, CallError> {
        let path = format!("/v3/payments/requests/{transaction_id}/check");
        self.get(ctx, &path, "").await
    }
}

/// Encodes a details lookup as repeated query parameters.
fn details_query(request: &DetailsRequest) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for transaction_id in &request.transaction_ids {
        query.append_pair("transactionId", &transaction_id.to_string());
    }
    for order_id in &request.order_ids {
        query.append_pair("orderId", order_id);
    }
    if let Some(fields) = request.fields {
        query.append_pair("fields", &fields.to_string());
    }
    query.finish()
}
