use super::{now_ts, Student, StudentFilter, StoreError, TenantStore};
use rusqlite::OptionalExtension;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PaymentStatus {
    Paid,
    Pending,
    Overdue,
}

impl PaymentStatus {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "Paid" => Some(PaymentStatus::Paid),
            "Pending" => Some(PaymentStatus::Pending),
            "Overdue" => Some(PaymentStatus::Overdue),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentStatus::Paid => "Paid",
            PaymentStatus::Pending => "Pending",
            PaymentStatus::Overdue => "Overdue",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: String,
    pub teacher_id: String,
    #[serde(rename = "student")]
    pub student_id: String,
    pub month: String,
    pub year: i64,
    pub amount: Option<f64>,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

/// One billing-period row per active student: the payment record when one
/// exists, otherwise a synthesized "Pending" with no amount.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusRow {
    pub student: Student,
    pub status: String,
    pub payment_id: Option<String>,
    pub amount: Option<f64>,
}

pub struct MarkPayment {
    pub student_id: String,
    pub month: String,
    pub year: i64,
    pub status: PaymentStatus,
    pub amount: Option<f64>,
}

const PAYMENT_COLS: &str =
    "id, teacher_id, student_id, month, year, amount, status, created_at, updated_at";

fn row_to_payment(r: &rusqlite::Row<'_>) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: r.get(0)?,
        teacher_id: r.get(1)?,
        student_id: r.get(2)?,
        month: r.get(3)?,
        year: r.get(4)?,
        amount: r.get(5)?,
        status: r.get(6)?,
        created_at: r.get(7)?,
        updated_at: r.get(8)?,
    })
}

impl TenantStore<'_> {
    /// Left-joins the tenant's active students against one billing period's
    /// payment rows. The join is an in-memory map keyed by student id, one
    /// query per side.
    pub fn payment_status_list(
        &self,
        month: &str,
        year: i64,
        filter: &StudentFilter,
    ) -> Result<Vec<StatusRow>, StoreError> {
        let students = self.list_students(filter)?;

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAYMENT_COLS} FROM payments
             WHERE teacher_id = ? AND month = ? AND year = ?"
        ))?;
        let payments = stmt
            .query_map((self.teacher_id, month, year), row_to_payment)?
            .collect::<Result<Vec<_>, _>>()?;

        let mut by_student: HashMap<String, Payment> = HashMap::new();
        for payment in payments {
            by_student.insert(payment.student_id.clone(), payment);
        }

        let rows = students
            .into_iter()
            .map(|student| match by_student.remove(&student.id) {
                Some(p) => StatusRow {
                    student,
                    status: p.status,
                    payment_id: Some(p.id),
                    amount: p.amount,
                },
                None => StatusRow {
                    student,
                    status: PaymentStatus::Pending.as_str().to_string(),
                    payment_id: None,
                    amount: None,
                },
            })
            .collect();
        Ok(rows)
    }

    /// Upserts the (student, month, year) record for this tenant. The target
    /// student is re-verified against the tenant first, so a forged student
    /// id from another tenant reads as absent.
    ///
    /// Amount rules: an explicit amount always wins; marking "Pending"
    /// without an amount forces it to 0; otherwise the stored amount is kept
    /// on update and defaults to 0 on insert.
    pub fn mark_payment(&self, mark: MarkPayment) -> Result<Payment, StoreError> {
        let month = mark.month.trim();
        if month.is_empty() {
            return Err(StoreError::validation("month is required"));
        }
        if self.get_student(&mark.student_id)?.is_none() {
            return Err(StoreError::NotFound("student"));
        }

        let overwrite_amount =
            mark.amount.is_some() || mark.status == PaymentStatus::Pending;
        let insert_amount = if mark.status == PaymentStatus::Pending {
            0.0
        } else {
            mark.amount.unwrap_or(0.0)
        };
        let sql = if overwrite_amount {
            "INSERT INTO payments(id, teacher_id, student_id, month, year, amount, status,
                                  created_at, updated_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(teacher_id, student_id, month, year) DO UPDATE SET
               status = excluded.status,
               amount = excluded.amount,
               updated_at = excluded.updated_at"
        } else {
            "INSERT INTO payments(id, teacher_id, student_id, month, year, amount, status,
                                  created_at, updated_at)
             VALUES(?, ?, ?, ?, ?, ?, ?, ?, ?)
             ON CONFLICT(teacher_id, student_id, month, year) DO UPDATE SET
               status = excluded.status,
               updated_at = excluded.updated_at"
        };
        let ts = now_ts();
        self.conn.execute(
            sql,
            (
                Uuid::new_v4().to_string(),
                self.teacher_id,
                &mark.student_id,
                month,
                mark.year,
                insert_amount,
                mark.status.as_str(),
                &ts,
                &ts,
            ),
        )?;

        let payment = self
            .conn
            .query_row(
                &format!(
                    "SELECT {PAYMENT_COLS} FROM payments
                     WHERE teacher_id = ? AND student_id = ? AND month = ? AND year = ?"
                ),
                (self.teacher_id, &mark.student_id, month, mark.year),
                row_to_payment,
            )
            .optional()?
            .ok_or(StoreError::NotFound("payment"))?;
        Ok(payment)
    }

    pub fn reset_payments(&self) -> Result<usize, StoreError> {
        let deleted = self
            .conn
            .execute("DELETE FROM payments WHERE teacher_id = ?", [self.teacher_id])?;
        Ok(deleted)
    }

    /// History rows for one student, used to show that soft deletion keeps
    /// billing history reachable.
    pub fn payments_for_student(&self, student_id: &str) -> Result<Vec<Payment>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT {PAYMENT_COLS} FROM payments
             WHERE teacher_id = ? AND student_id = ?
             ORDER BY year DESC, month"
        ))?;
        let payments = stmt
            .query_map((self.teacher_id, student_id), row_to_payment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(payments)
    }
}
