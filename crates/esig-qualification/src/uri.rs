//! Trusted list vocabulary and certificate OIDs (ETSI TS 119 612, EN 319 412)

/// Service type of a CA issuing qualified certificates
pub const CA_QC: &str = "http://uri.etsi.org/TrstSvc/Svctype/CA/QC";

pub mod status {
    const PREFIX: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/";

    pub const UNDER_SUPERVISION: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/undersupervision";
    pub const SUPERVISION_IN_CESSATION: &str =
        "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/supervisionincessation";
    pub const ACCREDITED: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/accredited";
    pub const SET_BY_NATIONAL_LAW: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/setbynationallaw";
    pub const GRANTED: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/granted";
    pub const WITHDRAWN: &str = "http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/withdrawn";

    /// Statuses under which a pre-eIDAS CA/QC service issued qualified certificates
    pub fn is_acceptable_before_eidas(uri: &str) -> bool {
        [UNDER_SUPERVISION, SUPERVISION_IN_CESSATION, ACCREDITED, SET_BY_NATIONAL_LAW].contains(&uri)
    }

    pub fn is_acceptable_after_eidas(uri: &str) -> bool {
        uri == GRANTED
    }

    /// Last path segment, for reports
    pub fn short(uri: &str) -> &str {
        uri.strip_prefix(PREFIX).unwrap_or(uri)
    }
}

pub mod qualifier {
    pub const QC_WITH_SSCD: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCWithSSCD";
    pub const QC_NO_SSCD: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCNoSSCD";
    pub const QC_WITH_QSCD: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCWithQSCD";
    pub const QC_NO_QSCD: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCNoQSCD";
    pub const QC_QSCD_STATUS_AS_IN_CERT: &str =
        "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCQSCDStatusAsInCert";
    pub const QC_SSCD_STATUS_AS_IN_CERT: &str =
        "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCSSCDStatusAsInCert";
    pub const QC_QSCD_MANAGED_ON_BEHALF: &str =
        "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCQSCDManagedOnBehalf";
    pub const QC_STATEMENT: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCStatement";
    pub const NOT_QUALIFIED: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/NotQualified";
    pub const QC_FOR_ESIG: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCForESig";
    pub const QC_FOR_ESEAL: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCForESeal";
    pub const QC_FOR_WSA: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCForWSA";
    pub const QC_FOR_LEGAL_PERSON: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/QCForLegalPerson";
}

pub mod additional_info {
    pub const FOR_ESIGNATURES: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/ForeSignatures";
    pub const FOR_ESEALS: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/ForeSeals";
    pub const FOR_WSA: &str = "http://uri.etsi.org/TrstSvc/TrustedList/SvcInfoExt/ForWebSiteAuthentication";
}

pub mod oid {
    /// Legacy QCP public policy (ETSI TS 101 456)
    pub const QCP_PUBLIC: &str = "0.4.0.1456.1.2";
    pub const QCP_PUBLIC_WITH_SSCD: &str = "0.4.0.1456.1.1";
    /// EN 319 411-2 policies
    pub const QCP_NATURAL: &str = "0.4.0.194112.1.0";
    pub const QCP_LEGAL: &str = "0.4.0.194112.1.1";
    pub const QCP_NATURAL_QSCD: &str = "0.4.0.194112.1.2";
    pub const QCP_LEGAL_QSCD: &str = "0.4.0.194112.1.3";
}
