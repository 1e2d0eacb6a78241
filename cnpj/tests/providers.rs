#![allow(clippy::unwrap_used, clippy::expect_used)]
//! BrasilAPI / ReceitaWS providers against a mock HTTP server.

use std::sync::Arc;
use std::time::Duration;

use petition_cnpj::BrasilApiProvider;
use petition_cnpj::CnpjProvider;
use petition_cnpj::CnpjResolver;
use petition_cnpj::LookupError;
use petition_cnpj::LookupSource;
use petition_cnpj::ProviderSettings;
use petition_cnpj::ReceitaWsProvider;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::Mock;
use wiremock::MockServer;
use wiremock::ResponseTemplate;
use wiremock::matchers::method;
use wiremock::matchers::path;

const CNPJ: &str = "60746948000112";

fn settings(server: &MockServer) -> ProviderSettings {
    ProviderSettings {
        base_url: server.uri(),
        lookup_timeout: Duration::from_millis(500),
        proxy_timeout: Duration::from_millis(500),
    }
}

fn brasilapi(server: &MockServer) -> BrasilApiProvider {
    BrasilApiProvider::new(reqwest::Client::new(), settings(server))
}

fn receitaws(server: &MockServer) -> ReceitaWsProvider {
    ReceitaWsProvider::new(reqwest::Client::new(), settings(server))
}

#[tokio::test]
async fn brasilapi_body_is_normalised() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/api/cnpj/v1/{CNPJ}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "razao_social": "BANCO BRADESCO S.A.",
            "cnpj": CNPJ,
            "logradouro": "NUCLEO CIDADE DE DEUS",
            "numero": "S/N",
            "municipio": "OSASCO",
            "uf": "SP",
            "cep": "06029900",
            "email": "ignored@example.com"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let record = brasilapi(&server).lookup(CNPJ).await.unwrap();
    assert_eq!(record.name, "BANCO BRADESCO S.A.");
    assert_eq!(record.address, "NUCLEO CIDADE DE DEUS, S/N, OSASCO/SP, 06029900");
    assert_eq!(record.email, "");
    assert_eq!(record.phone, "");
}

#[tokio::test]
async fn receitaws_maps_email_and_phone() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/cnpj/{CNPJ}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "nome": "BANCO BRADESCO S.A.",
            "cnpj": "60.746.948/0001-12",
            "logradouro": "NUCLEO CIDADE DE DEUS",
            "municipio": "OSASCO",
            "uf": "SP",
            "email": "contato@bradesco.example",
            "telefone": "(11) 3684-4011"
        })))
        .mount(&server)
        .await;

    let record = receitaws(&server).lookup(CNPJ).await.unwrap();
    assert_eq!(record.cnpj, "60.746.948/0001-12");
    assert_eq!(record.address, "NUCLEO CIDADE DE DEUS, , OSASCO/SP, ");
    assert_eq!(record.email, "contato@bradesco.example");
    assert_eq!(record.phone, "(11) 3684-4011");
}

#[tokio::test]
async fn receitaws_error_status_in_body_is_a_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "ERROR",
            "message": "CNPJ inválido"
        })))
        .mount(&server)
        .await;

    let err = receitaws(&server).lookup(CNPJ).await.unwrap_err();
    assert!(matches!(err, LookupError::Body { .. }), "{err:?}");
}

#[tokio::test]
async fn raw_fetch_passes_provider_status_through() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).set_body_string("slow down"))
        .mount(&server)
        .await;

    let err = brasilapi(&server).fetch_raw(CNPJ).await.unwrap_err();
    assert_eq!(err.proxy_status(), 429);
}

#[tokio::test]
async fn raw_fetch_returns_body_untouched() {
    let server = MockServer::start().await;
    let body = json!({ "razao_social": "X", "qsa": [{ "nome_socio": "Y" }] });
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .mount(&server)
        .await;

    assert_eq!(receitaws(&server).fetch_raw(CNPJ).await.unwrap(), body);
}

#[tokio::test]
async fn slow_provider_times_out_as_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&server)
        .await;

    let err = brasilapi(&server).lookup(CNPJ).await.unwrap_err();
    assert!(matches!(err, LookupError::Transport { .. }), "{err:?}");
    assert_eq!(err.proxy_status(), 500);
}

#[tokio::test]
async fn resolver_falls_back_from_brasilapi_to_receitaws() {
    let brasil = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&brasil)
        .await;
    let receita = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/cnpj/{CNPJ}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "OK",
            "nome": "BANCO BRADESCO S.A.",
            "cnpj": CNPJ
        })))
        .expect(1)
        .mount(&receita)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let resolver = CnpjResolver::new(
        dir.path().join("bancos.json"),
        vec![
            Arc::new(brasilapi(&brasil)) as Arc<dyn CnpjProvider>,
            Arc::new(receitaws(&receita)) as Arc<dyn CnpjProvider>,
        ],
    );

    let outcome = resolver.resolve("60.746.948/0001-12").await.unwrap();
    assert_eq!(outcome.source, LookupSource::ReceitaWs);
    assert_eq!(outcome.data.name, "BANCO BRADESCO S.A.");
}
