//! WASM HTTP client implementation using gloo_net
//!
//! This module provides HTTP functionality for WASM environments
//! using the gloo_net crate for making HTTP requests via the browser's fetch API.
//! Every request is sent with `credentials: include` so the session cookie travels.

use crate::config::ClientConfig;
use crate::error::{ErrorKind, Result};
use gloo_net::http::{Request, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use wasm_bindgen::JsValue;
use web_sys::{Blob, FormData, RequestCredentials, RequestMode};

use super::decode_body;
use crate::interface::{HttpClient, RequestApi};
use crate::model::dtos::{
    CourseDraft, GradeRequest, HomeworkDraft, HomeworkQuery, LoginParams, RegisterParams,
    ThemeDraft, UploadFile,
};
use crate::model::structs::{
    Course, CourseProgress, FileInfo, HomeworkSubmission, Student, Theme, UserProfile,
};

/// HTTP client for WASM environments using gloo_net
#[derive(Debug, Clone)]
pub struct WasmClient {
    config: ClientConfig,
}

impl HttpClient for WasmClient {
    async fn new(config: ClientConfig) -> Result<Self> {
        Ok(Self { config })
    }
}

fn js_error(e: JsValue) -> crate::error::Error {
    ErrorKind::ParseError(format!("{e:?}")).into()
}

impl WasmClient {
    /// Build a request with common headers and settings
    fn build_request(&self, method: &str, path: &str) -> RequestBuilder {
        let url = self.config.url(path);
        let builder = match method {
            "POST" => Request::post(&url),
            "PUT" => Request::put(&url),
            "PATCH" => Request::patch(&url),
            "DELETE" => Request::delete(&url),
            _ => Request::get(&url),
        };

        builder
            .mode(RequestMode::Cors)
            .credentials(RequestCredentials::Include)
            .header("Accept", "application/json")
    }

    /// Handle JSON response with error checking
    async fn handle_json_response<T: DeserializeOwned>(resp: Response) -> Result<T> {
        let ok = resp.ok();
        let status = resp.status();
        let text = resp.text().await?;

        log::debug!("Response status: {status}, length: {}", text.len());
        decode_body(status, ok, &text)
    }

    async fn send<T: DeserializeOwned>(&self, builder: RequestBuilder) -> Result<T> {
        let resp = builder.send().await?;
        Self::handle_json_response(resp).await
    }

    async fn send_json<B: serde::Serialize, T: DeserializeOwned>(
        &self,
        builder: RequestBuilder,
        body: &B,
    ) -> Result<T> {
        let resp = builder.json(body)?.send().await?;
        Self::handle_json_response(resp).await
    }

    async fn send_unit(&self, builder: RequestBuilder) -> Result<()> {
        self.send::<Value>(builder).await.map(|_| ())
    }
}

impl RequestApi for WasmClient {
    async fn me(&self) -> Result<UserProfile> {
        self.send(self.build_request("GET", "/auth/me")).await
    }

    async fn login(&self, params: &LoginParams) -> Result<Value> {
        self.send_json(self.build_request("POST", "/auth/login"), params)
            .await
    }

    async fn register(&self, params: &RegisterParams) -> Result<Value> {
        self.send_json(self.build_request("POST", "/auth/register"), params)
            .await
    }

    async fn logout(&self) -> Result<()> {
        self.send_unit(self.build_request("POST", "/auth/logout"))
            .await
    }

    async fn my_courses(&self) -> Result<Vec<Course>> {
        self.send(self.build_request("GET", "/courses/my")).await
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        self.send(self.build_request("GET", "/courses/all")).await
    }

    async fn course(&self, course_id: i64) -> Result<Course> {
        self.send(self.build_request("GET", &format!("/courses/{course_id}")))
            .await
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        self.send_json(self.build_request("POST", "/courses"), draft)
            .await
    }

    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> Result<Course> {
        self.send_json(
            self.build_request("PATCH", &format!("/courses/{course_id}")),
            draft,
        )
        .await
    }

    async fn delete_course(&self, course_id: i64) -> Result<()> {
        self.send_unit(self.build_request("DELETE", &format!("/courses/{course_id}")))
            .await
    }

    async fn course_students(&self, course_id: i64) -> Result<Vec<Student>> {
        self.send(self.build_request("GET", &format!("/courses/{course_id}/students")))
            .await
    }

    async fn enroll(&self, course_id: i64) -> Result<()> {
        self.send_unit(self.build_request("POST", &format!("/courses/{course_id}/enroll")))
            .await
    }

    async fn course_progress(&self, course_id: i64) -> Result<CourseProgress> {
        self.send(self.build_request("GET", &format!("/courses/{course_id}/progress")))
            .await
    }

    async fn course_themes(&self, course_id: i64) -> Result<Vec<Theme>> {
        self.send(self.build_request("GET", &format!("/themes/{course_id}")))
            .await
    }

    async fn create_theme(&self, course_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        self.send_json(
            self.build_request("POST", &format!("/themes/{course_id}")),
            draft,
        )
        .await
    }

    async fn update_theme(&self, theme_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        self.send_json(
            self.build_request("PATCH", &format!("/themes/theme/{theme_id}")),
            draft,
        )
        .await
    }

    async fn delete_theme(&self, theme_id: i64) -> Result<()> {
        self.send_unit(self.build_request("DELETE", &format!("/themes/theme/{theme_id}")))
            .await
    }

    async fn mark_theme_completed(&self, theme_id: i64) -> Result<()> {
        self.send_unit(
            self.build_request("POST", &format!("/themes/{theme_id}/mark-completed")),
        )
        .await
    }

    async fn homeworks(&self, query: &HomeworkQuery) -> Result<Vec<HomeworkSubmission>> {
        let pairs = query.to_pairs();
        let builder = self
            .build_request("GET", "/homeworks")
            .query(pairs.iter().map(|(k, v)| (*k, v.as_str())));
        self.send(builder).await
    }

    async fn my_homeworks(&self, theme_id: i64) -> Result<Vec<HomeworkSubmission>> {
        let theme_id = theme_id.to_string();
        let builder = self
            .build_request("GET", "/homeworks/my")
            .query([("theme_id", theme_id.as_str())]);
        self.send(builder).await
    }

    async fn submit_homework(&self, draft: &HomeworkDraft) -> Result<Value> {
        self.send_json(self.build_request("POST", "/homeworks"), draft)
            .await
    }

    async fn grade_homework(&self, homework_id: i64, grade: &GradeRequest) -> Result<Value> {
        self.send_json(
            self.build_request("PUT", &format!("/homeworks/{homework_id}/grade")),
            grade,
        )
        .await
    }

    async fn upload_theme_files(
        &self,
        theme_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<FileInfo>> {
        let form = FormData::new().map_err(js_error)?;
        for file in files {
            let bytes = js_sys::Uint8Array::from(file.content.as_slice());
            let parts = js_sys::Array::new();
            parts.push(&bytes);
            let blob = Blob::new_with_u8_array_sequence(&parts).map_err(js_error)?;
            form.append_with_blob_and_filename("files", &blob, &file.file_name)
                .map_err(js_error)?;
        }

        // No Content-Type header: the browser adds the multipart boundary.
        let request = self
            .build_request("POST", &format!("/files/theme/{theme_id}/uploadfiles"))
            .body(form)?;
        let resp = request.send().await?;
        Self::handle_json_response(resp).await
    }

    async fn theme_files(&self, theme_id: i64) -> Result<Vec<FileInfo>> {
        self.send(self.build_request("GET", &format!("/files/theme/{theme_id}/getfiles")))
            .await
    }

    async fn delete_file(&self, file_id: i64) -> Result<()> {
        self.send_unit(self.build_request("DELETE", &format!("/files/{file_id}")))
            .await
    }
}
