use super::{day_end, day_start, StoreError, TenantStore};
use chrono::{Datelike, Utc};
use serde::Serialize;

#[derive(Debug, Default)]
pub struct FinanceFilter {
    pub month: Option<String>,
    pub year: Option<i64>,
    pub grade: Option<String>,
    pub location: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BreakdownRow {
    pub year: i64,
    pub month: String,
    pub grade: String,
    pub location: String,
    pub total_income: f64,
    pub students_paid: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GrandTotal {
    pub total_income: f64,
    pub total_students_paid: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceReport {
    pub breakdown: Vec<BreakdownRow>,
    pub grand_total: GrandTotal,
}

#[derive(Debug, Serialize)]
pub struct GradeCount {
    pub grade: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: i64,
    pub present_today: i64,
    pub total_income_this_month: f64,
    pub total_income_this_year: f64,
    pub total_students_by_grade: Vec<GradeCount>,
    pub present_today_by_grade: Vec<GradeCount>,
    pub pending_payments_by_grade: Vec<GradeCount>,
    pub payment_status_this_month: Vec<StatusCount>,
}

fn wildcard(v: &Option<String>) -> Option<&String> {
    v.as_ref().filter(|s| s.as_str() != "All")
}

impl TenantStore<'_> {
    /// Income over Paid payments joined to students, broken down by
    /// (year, month, grade, location) plus a grand total over the same
    /// filter. "All" in any filter slot means no filter.
    pub fn finance_report(&self, filter: &FinanceFilter) -> Result<FinanceReport, StoreError> {
        let mut conds = String::new();
        let mut params: Vec<&dyn rusqlite::ToSql> = vec![&self.teacher_id];
        if let Some(month) = wildcard(&filter.month) {
            conds.push_str(" AND p.month = ?");
            params.push(month);
        }
        if let Some(year) = filter.year.as_ref() {
            conds.push_str(" AND p.year = ?");
            params.push(year);
        }
        if let Some(grade) = wildcard(&filter.grade) {
            conds.push_str(" AND s.grade = ?");
            params.push(grade);
        }
        if let Some(location) = wildcard(&filter.location) {
            conds.push_str(" AND s.location = ?");
            params.push(location);
        }

        let breakdown_sql = format!(
            "SELECT p.year, p.month, s.grade, s.location,
                    COALESCE(SUM(p.amount), 0), COUNT(*)
             FROM payments p
             JOIN students s ON s.id = p.student_id AND s.teacher_id = p.teacher_id
             WHERE p.teacher_id = ? AND p.status = 'Paid'{conds}
             GROUP BY p.year, p.month, s.grade, s.location
             ORDER BY p.year DESC, p.month, s.grade, s.location"
        );
        let mut stmt = self.conn.prepare(&breakdown_sql)?;
        let breakdown = stmt
            .query_map(&params[..], |r| {
                Ok(BreakdownRow {
                    year: r.get(0)?,
                    month: r.get(1)?,
                    grade: r.get(2)?,
                    location: r.get(3)?,
                    total_income: r.get(4)?,
                    students_paid: r.get(5)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let total_sql = format!(
            "SELECT COALESCE(SUM(p.amount), 0), COUNT(*)
             FROM payments p
             JOIN students s ON s.id = p.student_id AND s.teacher_id = p.teacher_id
             WHERE p.teacher_id = ? AND p.status = 'Paid'{conds}"
        );
        let grand_total = self.conn.query_row(&total_sql, &params[..], |r| {
            Ok(GrandTotal {
                total_income: r.get(0)?,
                total_students_paid: r.get(1)?,
            })
        })?;

        Ok(FinanceReport {
            breakdown,
            grand_total,
        })
    }

    /// Current-period roll-up for the landing page. Every count and sum is
    /// scoped to this tenant.
    pub fn dashboard(&self) -> Result<DashboardSummary, StoreError> {
        let now = Utc::now();
        let month_name = now.format("%B").to_string();
        let year = now.year() as i64;
        let today = now.date_naive();
        let (start, end) = (day_start(today), day_end(today));

        let total_students: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM students WHERE teacher_id = ? AND active = 1",
            [self.teacher_id],
            |r| r.get(0),
        )?;

        let total_students_by_grade = self.grade_counts(
            "SELECT grade, COUNT(*) FROM students
             WHERE teacher_id = ? AND active = 1
             GROUP BY grade ORDER BY grade",
            &[&self.teacher_id],
        )?;

        let present_today: i64 = self.conn.query_row(
            "SELECT COUNT(*)
             FROM attendance a
             JOIN students s ON s.id = a.student_id AND s.teacher_id = a.teacher_id
             WHERE a.teacher_id = ? AND a.date >= ? AND a.date <= ?
               AND a.status = 'Present' AND s.active = 1",
            (self.teacher_id, &start, &end),
            |r| r.get(0),
        )?;

        let present_today_by_grade = self.grade_counts(
            "SELECT COALESCE(a.class_grade, ''), COUNT(*)
             FROM attendance a
             JOIN students s ON s.id = a.student_id AND s.teacher_id = a.teacher_id
             WHERE a.teacher_id = ? AND a.date >= ? AND a.date <= ?
               AND a.status = 'Present' AND s.active = 1
             GROUP BY a.class_grade ORDER BY a.class_grade",
            &[&self.teacher_id, &start, &end],
        )?;

        // Paid this month = an actual Paid row for the current period exists;
        // everything else counts as Pending, whether or not a row exists.
        let paid_this_month: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM students s
             WHERE s.teacher_id = ? AND s.active = 1
               AND EXISTS(SELECT 1 FROM payments p
                          WHERE p.teacher_id = s.teacher_id AND p.student_id = s.id
                            AND p.month = ? AND p.year = ? AND p.status = 'Paid')",
            (self.teacher_id, &month_name, year),
            |r| r.get(0),
        )?;
        let pending_this_month = total_students - paid_this_month;
        let mut payment_status_this_month = Vec::new();
        if paid_this_month > 0 {
            payment_status_this_month.push(StatusCount {
                status: "Paid".to_string(),
                count: paid_this_month,
            });
        }
        if pending_this_month > 0 {
            payment_status_this_month.push(StatusCount {
                status: "Pending".to_string(),
                count: pending_this_month,
            });
        }

        let pending_payments_by_grade = self.grade_counts(
            "SELECT s.grade, COUNT(*) FROM students s
             WHERE s.teacher_id = ? AND s.active = 1
               AND NOT EXISTS(SELECT 1 FROM payments p
                              WHERE p.teacher_id = s.teacher_id AND p.student_id = s.id
                                AND p.month = ? AND p.year = ? AND p.status = 'Paid')
             GROUP BY s.grade ORDER BY s.grade",
            &[&self.teacher_id, &month_name, &year],
        )?;

        let total_income_this_year: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM payments
             WHERE teacher_id = ? AND status = 'Paid' AND year = ?",
            (self.teacher_id, year),
            |r| r.get(0),
        )?;
        let total_income_this_month: f64 = self.conn.query_row(
            "SELECT COALESCE(SUM(amount), 0) FROM payments
             WHERE teacher_id = ? AND status = 'Paid' AND year = ? AND month = ?",
            (self.teacher_id, year, &month_name),
            |r| r.get(0),
        )?;

        Ok(DashboardSummary {
            total_students,
            present_today,
            total_income_this_month,
            total_income_this_year,
            total_students_by_grade,
            present_today_by_grade,
            pending_payments_by_grade,
            payment_status_this_month,
        })
    }

    fn grade_counts(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Vec<GradeCount>, StoreError> {
        let mut stmt = self.conn.prepare(sql)?;
        let counts = stmt
            .query_map(params, |r| {
                Ok(GradeCount {
                    grade: r.get(0)?,
                    count: r.get(1)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(counts)
    }
}
