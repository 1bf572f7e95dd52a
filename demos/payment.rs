use linepay_client::{
    CallContext, ClientConfig, DefaultLinePayClient, LinePayClient,
    models::{ConfirmRequest, ConfirmUrlType, Currency, PaymentsPackage, PaymentsProduct, PaymentsRequest, RedirectUrls},
};
use std::io::{self, BufRead};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Reads LINE_PAY_CHANNEL_ID / LINE_PAY_CHANNEL_SECRET, and LINE_PAY_API_HOST if set
    let client = DefaultLinePayClient::new(ClientConfig::from_env()?)?;
    let ctx = CallContext::background();

    let request = PaymentsRequest {
        amount: 100,
        currency: Currency::Twd,
        order_id: format!("demo_{}", chrono::Utc::now().timestamp()),
        packages: vec![PaymentsPackage {
            id: "pkg_1".into(),
            amount: 100,
            name: Some("Demo shop".into()),
            user_fee: None,
            products: vec![PaymentsProduct {
                id: None,
                name: "Coffee".into(),
                image_url: None,
                quantity: 1,
                price: 100,
                original_price: None,
            }],
        }],
        redirect_urls: RedirectUrls {
            app_package_name: None,
            confirm_url: "http://localhost:9988/confirm".into(),
            confirm_url_type: Some(ConfirmUrlType::Client),
            cancel_url: "http://localhost:9988/cancel".into(),
        },
        options: None,
    };

    let info = client.payments_request(&ctx, &request).await?.into_result()?.ok_or("no payment info returned")?;
    println!("Approve the payment: {}", info.payment_url.web);
    println!("Press enter once approved");
    io::stdin().lock().lines().next();

    let confirm = ConfirmRequest { amount: request.amount, currency: request.currency };
    let response = client.payments_confirm(&ctx, info.transaction_id, &confirm).await?;
    println!("Confirm: code={}, message={}", response.return_code, response.return_message);
    Ok(())
}
