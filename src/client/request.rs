//! No-WASM HTTP client implementation using reqwest
//!
//! This module provides HTTP functionality for non-WASM environments
//! using the reqwest crate. Session cookies set by `/auth/login` are kept
//! in the client's cookie store and replayed on every request.

use crate::config::ClientConfig;
use crate::error::Result;
use reqwest::{
    multipart::{Form, Part},
    Client, RequestBuilder,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use super::decode_body;
use crate::interface::{HttpClient, RequestApi};
use crate::model::dtos::{
    CourseDraft, GradeRequest, HomeworkDraft, HomeworkQuery, LoginParams, RegisterParams,
    ThemeDraft, UploadFile,
};
use crate::model::structs::{
    Course, CourseProgress, FileInfo, HomeworkSubmission, Student, Theme, UserProfile,
};

/// HTTP client for no-WASM environments using reqwest
#[derive(Debug, Clone)]
pub struct NoWasmClient {
    client: Client,
    config: ClientConfig,
}

impl HttpClient for NoWasmClient {
    async fn new(config: ClientConfig) -> Result<Self> {
        let mut builder = Client::builder()
            .cookie_store(true)
            .danger_accept_invalid_certs(config.accept_invalid_certs);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;

        Ok(Self { client, config })
    }
}

impl NoWasmClient {
    /// Wrap an already configured reqwest client.
    pub fn with_client(client: Client, config: ClientConfig) -> Self {
        Self { client, config }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let resp = request.header("Accept", "application/json").send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        log::debug!("response {} ({} bytes): {}", status, text.len(), body_preview(&text));
        decode_body(status.as_u16(), status.is_success(), &text)
    }

    async fn send_unit(&self, request: RequestBuilder) -> Result<()> {
        self.send::<Value>(request).await.map(|_| ())
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.client.get(self.config.url(path))
    }

    fn post(&self, path: &str) -> RequestBuilder {
        self.client.post(self.config.url(path))
    }
}

// Short preview of a body for debug logs.
fn body_preview(text: &str) -> &str {
    let end = text
        .char_indices()
        .nth(80)
        .map(|(i, _)| i)
        .unwrap_or(text.len());
    &text[..end]
}

impl RequestApi for NoWasmClient {
    async fn me(&self) -> Result<UserProfile> {
        self.send(self.get("/auth/me")).await
    }

    async fn login(&self, params: &LoginParams) -> Result<Value> {
        self.send(self.post("/auth/login").json(params)).await
    }

    async fn register(&self, params: &RegisterParams) -> Result<Value> {
        self.send(self.post("/auth/register").json(params)).await
    }

    async fn logout(&self) -> Result<()> {
        self.send_unit(self.post("/auth/logout")).await
    }

    async fn my_courses(&self) -> Result<Vec<Course>> {
        self.send(self.get("/courses/my")).await
    }

    async fn all_courses(&self) -> Result<Vec<Course>> {
        self.send(self.get("/courses/all")).await
    }

    async fn course(&self, course_id: i64) -> Result<Course> {
        self.send(self.get(&format!("/courses/{course_id}"))).await
    }

    async fn create_course(&self, draft: &CourseDraft) -> Result<Course> {
        self.send(self.post("/courses").json(draft)).await
    }

    async fn update_course(&self, course_id: i64, draft: &CourseDraft) -> Result<Course> {
        let url = self.config.url(&format!("/courses/{course_id}"));
        self.send(self.client.patch(url).json(draft)).await
    }

    async fn delete_course(&self, course_id: i64) -> Result<()> {
        let url = self.config.url(&format!("/courses/{course_id}"));
        self.send_unit(self.client.delete(url)).await
    }

    async fn course_students(&self, course_id: i64) -> Result<Vec<Student>> {
        self.send(self.get(&format!("/courses/{course_id}/students")))
            .await
    }

    async fn enroll(&self, course_id: i64) -> Result<()> {
        self.send_unit(self.post(&format!("/courses/{course_id}/enroll")))
            .await
    }

    async fn course_progress(&self, course_id: i64) -> Result<CourseProgress> {
        self.send(self.get(&format!("/courses/{course_id}/progress")))
            .await
    }

    async fn course_themes(&self, course_id: i64) -> Result<Vec<Theme>> {
        self.send(self.get(&format!("/themes/{course_id}"))).await
    }

    async fn create_theme(&self, course_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        self.send(self.post(&format!("/themes/{course_id}")).json(draft))
            .await
    }

    async fn update_theme(&self, theme_id: i64, draft: &ThemeDraft) -> Result<Theme> {
        let url = self.config.url(&format!("/themes/theme/{theme_id}"));
        self.send(self.client.patch(url).json(draft)).await
    }

    async fn delete_theme(&self, theme_id: i64) -> Result<()> {
        let url = self.config.url(&format!("/themes/theme/{theme_id}"));
        self.send_unit(self.client.delete(url)).await
    }

    async fn mark_theme_completed(&self, theme_id: i64) -> Result<()> {
        self.send_unit(self.post(&format!("/themes/{theme_id}/mark-completed")))
            .await
    }

    async fn homeworks(&self, query: &HomeworkQuery) -> Result<Vec<HomeworkSubmission>> {
        self.send(self.get("/homeworks").query(&query.to_pairs()))
            .await
    }

    async fn my_homeworks(&self, theme_id: i64) -> Result<Vec<HomeworkSubmission>> {
        self.send(self.get("/homeworks/my").query(&[("theme_id", theme_id)]))
            .await
    }

    async fn submit_homework(&self, draft: &HomeworkDraft) -> Result<Value> {
        self.send(self.post("/homeworks").json(draft)).await
    }

    async fn grade_homework(&self, homework_id: i64, grade: &GradeRequest) -> Result<Value> {
        let url = self.config.url(&format!("/homeworks/{homework_id}/grade"));
        self.send(self.client.put(url).json(grade)).await
    }

    async fn upload_theme_files(
        &self,
        theme_id: i64,
        files: &[UploadFile],
    ) -> Result<Vec<FileInfo>> {
        let mut form = Form::new();
        for file in files {
            let part = Part::bytes(file.content.clone()).file_name(file.file_name.clone());
            form = form.part("files", part);
        }

        self.send(
            self.post(&format!("/files/theme/{theme_id}/uploadfiles"))
                .multipart(form),
        )
        .await
    }

    async fn theme_files(&self, theme_id: i64) -> Result<Vec<FileInfo>> {
        self.send(self.get(&format!("/files/theme/{theme_id}/getfiles")))
            .await
    }

    async fn delete_file(&self, file_id: i64) -> Result<()> {
        let url = self.config.url(&format!("/files/{file_id}"));
        self.send_unit(self.client.delete(url)).await
    }
}
