use crate::args::PayArgs;
use crate::commands::{today, Out};
use crate::error::{ErrorType, IntoResult};
use crate::model::Payment;
use crate::{Config, Result};

/// Records a payment against one charge and marks the charge as done.
///
/// The paid date defaults to today. If no receipt is given, any receipt already stored for the
/// charge is kept.
pub async fn pay(config: Config, args: PayArgs) -> Result<Out<Payment>> {
    let payment = Payment {
        house_id: args.house(),
        contribution_id: args.contribution(),
        due_date: args.due_date(),
        amount: args.amount(),
        paid_date: args.paid_date().unwrap_or_else(today),
        receipt: args.receipt().map(String::from),
    };
    config
        .db()
        .report_payment(&payment)
        .await
        .pub_result(ErrorType::Database)?;
    Ok(Out::new(
        format!(
            "Recorded payment of {} by house {} for contribution {} due {}",
            payment.amount, payment.house_id, payment.contribution_id, payment.due_date
        ),
        payment,
    ))
}
