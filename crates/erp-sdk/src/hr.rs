//! HR endpoints

use async_trait::async_trait;
use erp_common::{EntityId, ErpResult};
use erp_hr::{AttendanceEntry, Employee, HrGateway, PayPeriod, PayrollRun};
use serde_json::json;

use crate::client::ApiClient;

#[async_trait]
impl HrGateway for ApiClient {
    async fn list_employees(&self) -> ErpResult<Vec<Employee>> {
        Ok(self.get("/api/employees").await?)
    }

    async fn get_employee(&self, id: &EntityId) -> ErpResult<Employee> {
        Ok(self.get(&format!("/api/employees/{}", id)).await?)
    }

    async fn list_attendance(&self, period: PayPeriod) -> ErpResult<Vec<AttendanceEntry>> {
        let month = period.to_string();
        Ok(self.get_with("/api/attendance", &[("month", month.as_str())]).await?)
    }

    async fn mark_attendance(&self, entry: &AttendanceEntry) -> ErpResult<AttendanceEntry> {
        Ok(self.post("/api/attendance", entry).await?)
    }

    async fn auto_generate_payroll(&self, period: PayPeriod) -> ErpResult<PayrollRun> {
        Ok(self.post("/api/payroll/auto-generate", &json!({ "period": period })).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use chrono::NaiveDate;
    use erp_hr::{AttendanceStatus, HrError, HrService};
    use rust_decimal_macros::dec;
    use std::sync::Arc;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn ok(data: serde_json::Value) -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"success": true, "data": data}))
    }

    #[tokio::test]
    async fn test_auto_generate_payroll() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/payroll/auto-generate"))
            .and(body_json(json!({"period": "2024-04"})))
            .respond_with(ok(json!({
                "period": "2024-04",
                "payslips": [{
                    "employeeId": "e1", "period": "2024-04", "workingDays": 30,
                    "payableDays": "30", "gross": "3000.00", "deductions": "0", "net": "3000.00"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let run = client.auto_generate_payroll(PayPeriod::new(2024, 4).unwrap()).await.unwrap();
        assert_eq!(run.payslips.len(), 1);
        assert_eq!(run.total_net(), dec!(3000));
    }

    #[tokio::test]
    async fn test_mark_attendance_checks_employee_first() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/employees/e1"))
            .respond_with(ok(json!({
                "id": "e1", "employeeCode": "E1", "name": "Ada", "basicSalary": "3000"
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/api/employees/e2"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(json!({"success": false, "error": "Employee not found"})),
            )
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/api/attendance"))
            .and(body_json(json!({"employeeId": "e1", "date": "2024-04-02", "status": "half_day"})))
            .respond_with(ok(json!({"employeeId": "e1", "date": "2024-04-02", "status": "half_day"})))
            .expect(1)
            .mount(&server)
            .await;

        let client = ApiClient::new(ClientConfig::new(server.uri())).unwrap();
        let service = HrService::new(Arc::new(client));
        let date = NaiveDate::from_ymd_opt(2024, 4, 2).unwrap();

        let entry = service
            .mark_attendance(&EntityId::from("e1"), date, AttendanceStatus::HalfDay)
            .await
            .unwrap();
        assert_eq!(entry.status, AttendanceStatus::HalfDay);

        let err = service
            .mark_attendance(&EntityId::from("e2"), date, AttendanceStatus::Present)
            .await
            .unwrap_err();
        assert_eq!(err, HrError::EmployeeNotFound(EntityId::from("e2")));
    }
}
