use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

use crate::error::BusinessError;

/// A LINE Pay transaction id.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(pub i64);

impl Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TransactionId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

/// The application level status carried by every response.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReturnCode(pub String);

impl ReturnCode {
    /// The request succeeded.
    pub const SUCCESS: &'static str = "0000";

    /// Status check: the payment was authorized and can be confirmed.
    pub const CHECK_AUTHORIZED: &'static str = "0110";

    /// Status check: the user cancelled the payment.
    pub const CHECK_CANCELLED: &'static str = "0121";

    /// Status check: the payment failed.
    pub const CHECK_FAILED: &'static str = "0122";

    /// Status check: the payment already completed.
    pub const CHECK_COMPLETED: &'static str = "0123";

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_success(&self) -> bool {
        self.0 == Self::SUCCESS
    }
}

impl Display for ReturnCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for ReturnCode {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// The envelope wrapping every LINE Pay response.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T> {
    /// The return code, [`ReturnCode::SUCCESS`] on success.
    pub return_code: ReturnCode,

    /// A human readable description of the return code.
    pub return_message: String,

    /// The operation specific payload, absent on most failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub info: Option<T>,
}

impl<T> ApiResponse<T> {
    pub fn is_success(&self) -> bool {
        self.return_code.is_success()
    }

    /// Turns a non-success return code into a [`BusinessError`].
    pub fn into_result(self) -> Result<Option<T>, BusinessError> {
        if self.is_success() {
            Ok(self.info)
        } else {
            Err(BusinessError { return_code: self.return_code, return_message: self.return_message })
        }
    }
}

/// The currencies LINE Pay accepts.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    Usd,
    Jpy,
    Twd,
    Thb,
}

impl Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Usd => write!(f, "USD"),
            Self::Jpy => write!(f, "JPY"),
            Self::Twd => write!(f, "TWD"),
            Self::Thb => write!(f, "THB"),
        }
    }
}

/// A request to start a payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsRequest {
    /// The total amount, must equal the sum of the package amounts.
    pub amount: i64,

    pub currency: Currency,

    /// The merchant's order id, unique per payment.
    pub order_id: String,

    pub packages: Vec<PaymentsPackage>,

    pub redirect_urls: RedirectUrls,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<PaymentsOptions>,
}

/// A group of products inside a payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsPackage {
    pub id: String,

    pub amount: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fee: Option<i64>,

    pub products: Vec<PaymentsProduct>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,

    pub quantity: i64,

    pub price: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_price: Option<i64>,
}

/// Where LINE Pay sends the user once the payment is approved or cancelled.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedirectUrls {
    /// The Android package to return to when paying from an app.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_package_name: Option<String>,

    pub confirm_url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirm_url_type: Option<ConfirmUrlType>,

    pub cancel_url: String,
}

/// How the confirm URL is reached once the user approves a payment.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConfirmUrlType {
    /// The user's browser is redirected to the confirm URL.
    Client,

    /// LINE Pay calls the confirm URL from its servers.
    Server,

    /// Nothing is called, the merchant polls with a status check.
    None,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment: Option<PaymentOptions>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<DisplayOptions>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentOptions {
    /// Whether funds are captured at confirm time. When `false`, the payment stays
    /// authorized until a separate capture call. LINE Pay defaults to `true`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture: Option<bool>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_type: Option<PayType>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PayType {
    Normal,
    Preapproved,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DisplayOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locale: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_confirm_url_browser: Option<bool>,
}

/// The payload of a successful payments request.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentsInfo {
    pub payment_url: PaymentUrl,

    pub transaction_id: TransactionId,

    pub payment_access_token: String,
}

/// The URLs the user opens to approve a payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PaymentUrl {
    pub web: String,
    pub app: String,
}

/// A request to confirm an approved payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfirmRequest {
    pub amount: i64,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmInfo {
    pub order_id: String,

    pub transaction_id: TransactionId,

    /// Set when the payment was created with capture disabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_expire_date: Option<DateTime<Utc>>,

    /// The key for preapproved payments.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reg_key: Option<String>,

    #[serde(default)]
    pub pay_info: Vec<PayInfo>,

    #[serde(default)]
    pub packages: Vec<PackageInfo>,
}

/// A package as echoed back in confirm and details responses.
///
/// Confirm only returns the id, amount and user fee; details lookups add the name and the
/// products.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    pub id: String,

    pub amount: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_fee_amount: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub products: Vec<PaymentsProduct>,
}

/// How a payment was funded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayInfo {
    pub method: String,

    pub amount: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_nickname: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credit_card_brand: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub masked_credit_card_number: Option<String>,
}

/// A request to capture an authorized payment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaptureRequest {
    pub amount: i64,
    pub currency: Currency,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureInfo {
    pub order_id: String,

    pub transaction_id: TransactionId,

    #[serde(default)]
    pub pay_info: Vec<PayInfo>,
}

/// A request to refund a captured payment. Omitting the amount refunds it in full.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refund_amount: Option<i64>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundInfo {
    pub refund_transaction_id: TransactionId,

    pub refund_transaction_date: DateTime<Utc>,
}

/// Which parts of a payment a details lookup returns.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DetailsFields {
    All,
    Transaction,
    Order,
}

impl Display for DetailsFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => write!(f, "ALL"),
            Self::Transaction => write!(f, "TRANSACTION"),
            Self::Order => write!(f, "ORDER"),
        }
    }
}

/// A lookup of payments by transaction and/or order id.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DetailsRequest {
    pub transaction_ids: Vec<TransactionId>,

    pub order_ids: Vec<String>,

    /// Defaults to every field when unset.
    pub fields: Option<DetailsFields>,
}

/// A payment as returned by a details lookup.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetails {
    pub transaction_id: TransactionId,

    pub transaction_date: DateTime<Utc>,

    /// `PAYMENT`, `PAYMENT_REFUND` or `PARTIAL_REFUND`.
    pub transaction_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pay_status: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub merchant_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub authorization_expire_date: Option<DateTime<Utc>>,

    #[serde(default)]
    pub pay_info: Vec<PayInfo>,

    #[serde(default)]
    pub packages: Vec<PackageInfo>,

    #[serde(default)]
    pub refund_list: Vec<RefundDetails>,

    /// Set on refund transactions, the payment that was refunded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_transaction_id: Option<TransactionId>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefundDetails {
    pub refund_transaction_id: TransactionId,

    pub transaction_type: String,

    pub refund_amount: i64,

    pub refund_transaction_date: DateTime<Utc>,
}

/// The response of operations with no payload, such as void or status check.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Empty {}
